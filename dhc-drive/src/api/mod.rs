//! Capability layer over the Drive v3 REST surface.
//!
//! The [`DriveApi`] trait is the only thing the lister and downloader know
//! about the remote store. The production implementation is
//! [`DriveHttpClient`], an authenticated reqwest handle; tests script their
//! own doubles against the same trait.
use async_trait::async_trait;
use dhc_common::client;
use log::debug;
use reqwest::header::{CONTENT_RANGE, HeaderMap, RANGE};
use reqwest::{Client, StatusCode};
use std::fmt::Debug;

use serde::Deserialize;

use crate::auth::{self, ServiceAccountKey};
use crate::error::DriveError;

/// Listing and media endpoint of the Drive v3 API.
pub const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";

/// Fields requested from the listing endpoint; everything else the API could
/// return is dead weight.
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";

/// One page of a file listing, as returned by the remote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub files: Vec<FileResource>,
}

/// Wire model of a single listed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// One fetched slice of a remote file's bytes.
#[derive(Debug, Clone)]
pub struct FileChunk {
    pub data: Vec<u8>,
    /// Total object size, once the server reported it.
    pub total_size: Option<u64>,
    /// Whether the remote signaled this was the final chunk.
    pub is_last: bool,
}

/// Read-only capability over the remote file store.
#[async_trait]
pub trait DriveApi: Send + Sync + Debug {
    /// Fetches one page of the filtered file listing.
    async fn list_page(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FileListPage, DriveError>;

    /// Fetches up to `len` bytes of the file's content starting at `offset`.
    async fn fetch_chunk(
        &self,
        file_id: &str,
        offset: u64,
        len: u64,
    ) -> Result<FileChunk, DriveError>;
}

/// Authenticated HTTP handle over the Drive v3 API.
#[derive(Debug, Clone)]
pub struct DriveHttpClient {
    client: Client,
    access_token: String,
}

impl DriveHttpClient {
    /// Builds the handle by exchanging the service-account key for a
    /// read-only access token. This is the only place the auth protocol is
    /// touched; past this point the token rides along as an opaque header.
    pub async fn authenticate(key: &ServiceAccountKey) -> Result<Self, auth::Error> {
        let client = client!();
        let access_token = key.fetch_access_token(&client).await?;

        Ok(Self {
            client,
            access_token,
        })
    }
}

#[async_trait]
impl DriveApi for DriveHttpClient {
    async fn list_page(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<FileListPage, DriveError> {
        let mut request = self
            .client
            .get(FILES_ENDPOINT)
            .query(&[("q", query), ("fields", LIST_FIELDS)])
            .query(&[("pageSize", page_size)])
            .bearer_auth(&self.access_token);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(DriveError::ListingFailed {
                message: response.status().to_string(),
            });
        }

        Ok(response.json::<FileListPage>().await?)
    }

    async fn fetch_chunk(
        &self,
        file_id: &str,
        offset: u64,
        len: u64,
    ) -> Result<FileChunk, DriveError> {
        let url = format!("{}/{}", FILES_ENDPOINT, file_id);
        let range = format!("bytes={}-{}", offset, offset + len - 1);

        let response = self
            .client
            .get(&url)
            .query(&[("alt", "media")])
            .header(RANGE, &range)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DriveError::ChunkRequestFailed {
                message: status.to_string(),
            });
        }

        let total_size = content_range_total(response.headers());
        let data = response.bytes().await?.to_vec();

        let is_last = if status == StatusCode::OK {
            // Server ignored the range and sent the whole object at once.
            true
        } else if let Some(total) = total_size {
            offset + data.len() as u64 >= total
        } else {
            // No Content-Range total; a short read means the object is drained.
            (data.len() as u64) < len
        };

        debug!(
            "Chunk {}..{} of {} ({} bytes, last: {})",
            offset,
            offset + data.len() as u64,
            file_id,
            data.len(),
            is_last
        );

        Ok(FileChunk {
            data,
            total_size,
            is_last,
        })
    }
}

/// Pulls the total object size out of a `Content-Range: bytes a-b/total`
/// header, when present and well-formed.
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)?
        .to_str()
        .ok()?
        .rsplit_once('/')?
        .1
        .parse()
        .ok()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use dhc_common::progress::{DownloadProgressUpdater, LogType, ProgressListener};

    /// Scripted [`DriveApi`] double serving fixed listing pages and in-memory
    /// file contents. Page tokens are the stringified index of the next page.
    #[derive(Debug, Default)]
    pub(crate) struct MockDriveApi {
        pub pages: Vec<FileListPage>,
        pub blobs: HashMap<String, Vec<u8>>,
        /// File id whose chunk requests always fail.
        pub fail_chunks_for: Option<String>,
        pub list_calls: Mutex<Vec<(String, Option<String>)>>,
        pub chunk_calls: Mutex<Vec<(String, u64, u64)>>,
    }

    #[async_trait]
    impl DriveApi for MockDriveApi {
        async fn list_page(
            &self,
            query: &str,
            _page_size: u32,
            page_token: Option<&str>,
        ) -> Result<FileListPage, DriveError> {
            self.list_calls
                .lock()
                .unwrap()
                .push((query.to_string(), page_token.map(str::to_string)));

            let index = match page_token {
                None => 0,
                Some(token) => token.parse::<usize>().map_err(|_| DriveError::ListingFailed {
                    message: format!("bad page token: {token}"),
                })?,
            };

            Ok(self.pages.get(index).cloned().unwrap_or(FileListPage {
                next_page_token: None,
                files: Vec::new(),
            }))
        }

        async fn fetch_chunk(
            &self,
            file_id: &str,
            offset: u64,
            len: u64,
        ) -> Result<FileChunk, DriveError> {
            self.chunk_calls
                .lock()
                .unwrap()
                .push((file_id.to_string(), offset, len));

            if self.fail_chunks_for.as_deref() == Some(file_id) {
                return Err(DriveError::ChunkRequestFailed {
                    message: "503 Service Unavailable".to_string(),
                });
            }

            let blob = self
                .blobs
                .get(file_id)
                .ok_or_else(|| DriveError::ChunkRequestFailed {
                    message: "404 Not Found".to_string(),
                })?;

            let total = blob.len() as u64;
            let start = offset.min(total) as usize;
            let end = (offset + len).min(total) as usize;

            Ok(FileChunk {
                data: blob[start..end].to_vec(),
                total_size: Some(total),
                is_last: end as u64 >= total,
            })
        }
    }

    /// Listener double recording every byte-progress value it is fed.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingListener {
        pub bytes_seen: Arc<Mutex<Vec<u64>>>,
        pub totals_seen: Arc<Mutex<Vec<u64>>>,
    }

    impl ProgressListener for RecordingListener {
        fn set_main_total(&self, _total: u64) {}
        fn main_tick(&self) {}
        fn main_done(&self) {}

        fn add_download_task(
            &self,
            _name: String,
            _total_size: Option<u64>,
        ) -> Box<dyn DownloadProgressUpdater> {
            Box::new(RecordingUpdater {
                bytes_seen: self.bytes_seen.clone(),
                totals_seen: self.totals_seen.clone(),
            })
        }

        fn log_event(&self, _log_type: LogType, _target: &str, _message: &str) {}
    }

    #[derive(Debug)]
    struct RecordingUpdater {
        bytes_seen: Arc<Mutex<Vec<u64>>>,
        totals_seen: Arc<Mutex<Vec<u64>>>,
    }

    impl DownloadProgressUpdater for RecordingUpdater {
        fn set_progress(&self, bytes_downloaded: u64) {
            self.bytes_seen.lock().unwrap().push(bytes_downloaded);
        }

        fn set_total_size(&self, total_size: u64) {
            self.totals_seen.lock().unwrap().push(total_size);
        }

        fn finish(&self) {}
    }
}
