use dhc_drive::DriveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    /// The initial folder listing failed; the batch never started.
    #[error("Failed to list remote folder: {source}")]
    ListingFailed {
        #[from]
        source: DriveError,
    },
}
