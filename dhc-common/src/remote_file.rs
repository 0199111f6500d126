//! Main representation of a remote Drive file
//!
//! # RemoteFile
//! A [`RemoteFile` struct](RemoteFile) is the descriptor of a single matched
//! file inside the scanned Drive folder: the opaque file id used by the API,
//! the original filename and the media type the server reported.
use serde::{Deserialize, Serialize};

use std::fmt::Debug;

use crate::conversion::TargetFormat;

/// Catchall model for the necessary parts of a Drive file to properly identify,
/// download and convert it.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    /// Opaque file id given by the Drive API
    pub id: String,
    /// Original filename, including its extension
    pub name: String,
    /// Media type reported by the API.
    ///
    /// Some uploads carry a generic type (e.g. `application/octet-stream`)
    /// even when the filename ends in `.heic`, so this is informational only.
    pub mime_type: String,
}

impl Debug for RemoteFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFile")
            .field("File ID", &self.id)
            .field("Name", &self.name)
            .field("Media Type", &self.mime_type)
            .finish()
    }
}

impl RemoteFile {
    /// Derives the converted file's name by swapping the original extension
    /// with the target format's extension.
    ///
    /// Names without a dot get the extension appended.
    ///
    /// # Examples
    /// ```
    /// # use dhc_common::remote_file::RemoteFile;
    /// # use dhc_common::conversion::TargetFormat;
    /// let file = RemoteFile {
    ///     id: "1aZ".to_string(),
    ///     name: "photo.HEIC".to_string(),
    ///     mime_type: "image/heic".to_string(),
    /// };
    /// assert_eq!(file.output_name(TargetFormat::Webp), "photo.webp");
    /// ```
    pub fn output_name(&self, format: TargetFormat) -> String {
        converted_file_name(&self.name, format)
    }
}

/// Swaps the extension of `original` with the target format's extension.
/// Names without a dot get the extension appended.
pub fn converted_file_name(original: &str, format: TargetFormat) -> String {
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };

    format!("{}.{}", stem, format.extension())
}

/// An in-memory copy of a fully downloaded remote file.
///
/// Owned by the batch for the lifetime of one item and dropped after the
/// conversion attempt, success or failure.
#[derive(Debug, Clone)]
pub struct DownloadedBlob {
    /// The originating file's name.
    pub name: String,
    /// The raw file bytes.
    pub data: Vec<u8>,
}

impl DownloadedBlob {
    /// Same derivation as [`RemoteFile::output_name`], available after the
    /// descriptor is gone.
    pub fn output_name(&self, format: TargetFormat) -> String {
        converted_file_name(&self.name, format)
    }
}
