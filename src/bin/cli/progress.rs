//! Progress bar implementation for CLI operations.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use pck::AtomicProgress;
use pck::progress::ProgressReporter;

/// Progress bar driven by library progress callbacks.
///
/// Cancellation requested through the shared [`AtomicProgress`] (by the
/// Ctrl+C handler) is passed back to the library as a `false` return.
pub struct CliProgress {
    bar: ProgressBar,
    cancel: Arc<AtomicProgress>,
}

impl CliProgress {
    /// Creates a new progress bar; `unit` names what is counted.
    pub fn new(unit: &str, quiet: bool, cancel: &Arc<AtomicProgress>) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(0);
            let template = format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{eta}}) {{msg}}",
                unit
            );
            if let Ok(style) = ProgressStyle::default_bar().template(&template) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };

        Self {
            bar,
            cancel: cancel.clone(),
        }
    }

    /// Sets the message
    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Finishes the progress bar
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Finishes with a message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.abandon_with_message(msg.into());
    }
}

impl ProgressReporter for CliProgress {
    fn on_progress(&mut self, current: u64, total: u64) -> bool {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(current);
        !self.cancel.is_cancelled()
    }
}
