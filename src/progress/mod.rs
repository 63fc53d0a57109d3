//! Progress reporting module
//!
//! Upload tasks publish `ProgressEvent`s over a crossbeam channel; the
//! terminal reporter consumes them on its own thread. The core never
//! touches the terminal directly.

mod reporter;

pub use reporter::*;

/// Event emitted by the upload coordinator as a publish run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Publish started with the given number of entries to upload
    Started {
        /// Total uploads attempted this run
        attempted: usize,
    },
    /// A single upload completed successfully
    Uploaded {
        /// File name of the uploaded entry
        file_name: String,
        /// Uploads completed so far (success or failure)
        completed: usize,
        /// Total uploads attempted this run
        attempted: usize,
    },
    /// A single upload failed; siblings continue
    Failed {
        /// File name of the failed entry
        file_name: String,
        /// Failure description
        message: String,
        /// Uploads completed so far (success or failure)
        completed: usize,
        /// Total uploads attempted this run
        attempted: usize,
    },
    /// Every dispatched upload has completed
    Finished {
        /// Successful upload count
        succeeded: usize,
        /// Failed upload count
        failed: usize,
    },
}
