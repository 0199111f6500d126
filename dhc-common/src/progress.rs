use std::fmt::Debug;
use std::sync::Arc;

/// Type of batch event, used for styling or filtering messages in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    /// General informational message (e.g. found-count, empty folder).
    Info,
    /// A file was converted and written successfully.
    Success,
    /// A file was skipped after a per-item failure (skip-and-report mode).
    Skip,
    /// A non-critical issue.
    Warning,
    /// An error occurred for a specific file being processed.
    Error,
}

/// Trait for reporting overall batch progress.
/// All methods should be thread-safe.
pub trait ProgressListener: Send + Sync + Debug {
    /// Sets the total number of candidate files for the main progress.
    fn set_main_total(&self, total: u64);
    /// Signals that one candidate has been fully processed.
    fn main_tick(&self);
    /// Signals that the whole batch is done, successfully or not.
    fn main_done(&self);

    /// Adds a new task for individual download progress tracking.
    ///
    /// # Arguments
    /// * `name`: A descriptive name for the task (e.g. filename).
    /// * `total_size`: The total size in bytes of the remote file, if known.
    ///
    /// # Returns
    /// A `Box<dyn DownloadProgressUpdater>` fed with the cumulative byte
    /// count after every fetched chunk.
    fn add_download_task(
        &self,
        name: String,
        total_size: Option<u64>,
    ) -> Box<dyn DownloadProgressUpdater>;

    /// Logs a categorized event message to be displayed in the progress UI.
    ///
    /// # Arguments
    /// * `log_type`: The category of the log message.
    /// * `target`: A string identifying the subject of the log (e.g. filename).
    /// * `message`: The descriptive message content.
    fn log_event(&self, log_type: LogType, target: &str, message: &str);
}

/// Trait for updating the progress of an individual download task.
/// Implementations will typically wrap a specific progress bar or UI element.
pub trait DownloadProgressUpdater: Send + Sync + Debug {
    /// Sets the cumulative number of bytes downloaded for this task.
    ///
    /// Values never regress between calls.
    fn set_progress(&self, bytes_downloaded: u64);
    /// Sets or updates the total size of the file being downloaded.
    /// Useful when the size only becomes known mid-download (e.g. from a
    /// Content-Range header).
    fn set_total_size(&self, total_size: u64);
    /// Signals that this download task is finished (successfully or not).
    fn finish(&self);
}

/// A no-operation implementation of `ProgressListener`.
/// Used as a default when no actual progress reporting is needed by the
/// library consumer.
#[derive(Debug, Clone)]
pub struct NoOpProgressListener;

impl ProgressListener for NoOpProgressListener {
    fn set_main_total(&self, _total: u64) {}
    fn main_tick(&self) {}
    fn main_done(&self) {}
    fn add_download_task(
        &self,
        _name: String,
        _total_size: Option<u64>,
    ) -> Box<dyn DownloadProgressUpdater> {
        Box::new(NoOpDownloadProgressUpdater)
    }
    fn log_event(&self, _log_type: LogType, _target: &str, _message: &str) {}
}

/// A no-operation implementation of `DownloadProgressUpdater`.
#[derive(Debug, Clone)]
pub struct NoOpDownloadProgressUpdater;

impl DownloadProgressUpdater for NoOpDownloadProgressUpdater {
    fn set_progress(&self, _bytes_downloaded: u64) {}
    fn set_total_size(&self, _total_size: u64) {}
    fn finish(&self) {}
}

/// Convenience type alias for a shared, thread-safe progress listener.
pub type SharedProgressListener = Arc<dyn ProgressListener>;

/// Returns a shared instance of a `NoOpProgressListener`.
pub fn no_op_progress_listener() -> SharedProgressListener {
    Arc::new(NoOpProgressListener)
}
