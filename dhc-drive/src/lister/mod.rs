//! Candidate lister for the scanned Drive folder.
//!
//! Issues one filtered, paged query against the parent folder and accumulates
//! every HEIC/HEIF match before returning. Matching is intentionally loose:
//! some phones upload HEIC files under a generic media type, so the filename
//! is checked alongside the declared type.
use log::debug;
use std::sync::Arc;

use dhc_common::remote_file::RemoteFile;

use crate::api::DriveApi;
use crate::error::DriveError;

/// Max number of files requested per listing page.
pub const PAGE_SIZE: u32 = 1000;

/// Finds every HEIC/HEIF file inside a single Drive folder.
#[derive(Debug, Clone)]
pub struct HeicLister {
    api: Arc<dyn DriveApi>,
}

impl HeicLister {
    pub fn new(api: Arc<dyn DriveApi>) -> Self {
        Self { api }
    }

    /// Builds the single filter predicate: parent-folder membership combined
    /// with the HEIC/HEIF media types or a `.heic` filename in either case.
    fn build_query(folder_id: &str) -> String {
        format!(
            "'{}' in parents and (mimeType='image/heic' or mimeType='image/heif' or name contains '.heic' or name contains '.HEIC')",
            folder_id
        )
    }

    /// Collects all matching files in the folder, walking every listing page.
    ///
    /// Returns the matches in listing order. An empty folder yields an empty
    /// list; that is a normal terminal state, not an error.
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<RemoteFile>, DriveError> {
        let query = Self::build_query(folder_id);

        let mut found = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page = 1;

        loop {
            debug!("Scanning listing page {}", page);

            let result = self
                .api
                .list_page(&query, PAGE_SIZE, page_token.as_deref())
                .await?;

            found.extend(result.files.into_iter().map(|file| RemoteFile {
                id: file.id,
                name: file.name,
                mime_type: file.mime_type,
            }));

            match result.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }

            page += 1;
        }

        debug!("List size: {}", found.len());
        Ok(found)
    }
}
