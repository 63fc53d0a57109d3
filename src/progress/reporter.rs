//! Terminal progress reporter
//!
//! Uses indicatif for a spinner status line plus a files bar showing the
//! running completed/attempted fraction.

use crate::progress::ProgressEvent;
use crossbeam_channel::Receiver;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::thread::JoinHandle;

/// Progress reporter for publish runs
pub struct ProgressReporter {
    multi: MultiProgress,
    files_bar: ProgressBar,
    status: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("Invalid template"),
        );

        let files_bar = multi.add(ProgressBar::new(0));
        files_bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%)")
                .expect("Invalid template")
                .progress_chars("=> "),
        );
        files_bar.set_prefix("Uploads");

        Self {
            multi,
            files_bar,
            status,
        }
    }

    /// Create a disabled progress reporter (for quiet mode)
    pub fn disabled() -> Self {
        let reporter = Self::new();
        reporter.multi.set_draw_target(ProgressDrawTarget::hidden());
        reporter
    }

    /// Apply a single progress event
    pub fn handle(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { attempted } => {
                self.files_bar.set_length(*attempted as u64);
                self.status.set_message("Uploading...".to_string());
            }
            ProgressEvent::Uploaded {
                file_name,
                completed,
                ..
            } => {
                self.files_bar.set_position(*completed as u64);
                self.status.set_message(format!("Uploaded: {file_name}"));
            }
            ProgressEvent::Failed {
                file_name,
                completed,
                ..
            } => {
                self.files_bar.set_position(*completed as u64);
                self.status
                    .set_message(format!("Error uploading: {file_name}"));
            }
            ProgressEvent::Finished { succeeded, failed } => {
                self.files_bar.finish();
                self.status.finish_with_message(format!(
                    "Done: {succeeded} uploaded, {failed} failed"
                ));
            }
        }
    }

    /// Consume events from a channel on a dedicated thread until the
    /// sending side hangs up.
    pub fn attach(self, receiver: Receiver<ProgressEvent>) -> JoinHandle<()> {
        std::thread::spawn(move || {
            for event in receiver {
                self.handle(&event);
            }
        })
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
