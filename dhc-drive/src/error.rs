use thiserror::Error;

/// Enumerates the possible errors that can arise while talking to the remote
/// file store.
///
/// Listing and chunk failures are batch-fatal; the orchestrator surfaces them
/// to the caller instead of retrying.
#[derive(Error, Debug)]
pub enum DriveError {
    /// An error occurred during a network request (e.g. connection timeout,
    /// DNS resolution failure) or while decoding its body.
    #[error("Connection Error")]
    ConnectionError(#[from] reqwest::Error),

    /// The listing endpoint refused the query or returned a non-success
    /// status.
    #[error("Drive refused the listing query: {message}")]
    ListingFailed { message: String },

    /// A single ranged request returned a non-success status.
    #[error("Chunk request failed: {message}")]
    ChunkRequestFailed { message: String },

    /// A chunk of `file_name` could not be fetched; the download is
    /// abandoned and the batch aborts.
    #[error("Failed to download chunk of {file_name}: {message}")]
    ChunkDownloadFail { file_name: String, message: String },
}
