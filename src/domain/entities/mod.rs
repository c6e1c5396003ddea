pub mod group;
pub mod project;
pub mod registry;

pub use group::Group;
pub use project::Project;
pub use registry::{Registry, RegistryError};
