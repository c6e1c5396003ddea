pub mod progress;

pub use progress::{notify, NoopProgress, ProgressReporter};
