pub mod display;
pub mod progress;

pub use display::DisplayHelper;
pub use progress::IndicatifProgress;
