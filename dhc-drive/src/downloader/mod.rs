//! Chunked downloader streaming a remote file into memory.
//!
//! The whole object is pulled through repeated bounded ranged requests, in
//! order, appending to one growing buffer. Cumulative byte progress goes to
//! the injected listener after every chunk; the values never regress.
use log::debug;
use std::sync::Arc;

use dhc_common::progress::SharedProgressListener;
use dhc_common::remote_file::{DownloadedBlob, RemoteFile};

use crate::api::DriveApi;
use crate::error::DriveError;

/// Size of each ranged request. Matches the remote quota unit well enough
/// that larger chunks buy nothing.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Downloads one remote file at a time via sequential ranged requests.
#[derive(Debug, Clone)]
pub struct ChunkedDownloader {
    api: Arc<dyn DriveApi>,
    chunk_size: u64,
}

impl ChunkedDownloader {
    pub fn new(api: Arc<dyn DriveApi>) -> Self {
        Self {
            api,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Overrides the ranged request size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Streams the whole remote file into an owned buffer.
    ///
    /// Any chunk failure abandons the download and surfaces the offending
    /// file's name; the orchestrator treats it as fatal to the batch.
    pub async fn download(
        &self,
        file: &RemoteFile,
        listener: &SharedProgressListener,
    ) -> Result<DownloadedBlob, DriveError> {
        debug!("Fetching {} (id {})", file.name, file.id);

        let updater = listener.add_download_task(file.name.clone(), None);
        let mut data: Vec<u8> = Vec::new();

        loop {
            let offset = data.len() as u64;

            let chunk = match self.api.fetch_chunk(&file.id, offset, self.chunk_size).await {
                Ok(chunk) => chunk,
                Err(error) => {
                    updater.finish();
                    return Err(DriveError::ChunkDownloadFail {
                        file_name: file.name.clone(),
                        message: error.to_string(),
                    });
                }
            };

            data.extend_from_slice(&chunk.data);

            if let Some(total) = chunk.total_size {
                updater.set_total_size(total);
            }
            updater.set_progress(data.len() as u64);

            if chunk.is_last {
                break;
            }
        }

        updater.finish();
        debug!("Finished downloading {} ({} bytes)", file.name, data.len());

        Ok(DownloadedBlob {
            name: file.name.clone(),
            data,
        })
    }
}
