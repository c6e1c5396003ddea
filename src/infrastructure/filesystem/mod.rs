pub mod registry_store;

pub use registry_store::{RegistryDocument, RegistryStore, RegistryStoreError};
