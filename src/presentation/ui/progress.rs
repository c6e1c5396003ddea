use indicatif::ProgressBar;

use super::display::DisplayHelper;
use crate::application::services::progress::ProgressReporter;

/// Progress bar observer for the orchestrator and the command runner
///
/// The bar is removed from the terminal once the batch completes.
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    pub fn new(display: &DisplayHelper, message: &str) -> Self {
        Self {
            bar: display.create_progress_bar(0, message),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn increment(&self) {
        self.bar.inc(1);
    }

    fn complete(&self) {
        self.bar.finish_and_clear();
    }
}
