//! Provides the sequential conversion batch and related logic.
//!
//! This module contains the [`ConversionQueue`], the central component
//! driving the pipeline: one listing call, then every candidate downloaded
//! and converted in listing order, one at a time. Progress and per-file
//! outcomes are reported through a
//! [`ProgressListener`](dhc_common::progress::ProgressListener).
//!
//! Failure handling is deliberately asymmetric: a download failure always
//! halts the batch, while a conversion failure follows the configured
//! [`FailurePolicy`].
mod summary;

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::spawn_blocking;

use dhc_common::conversion::{ConversionOutcome, ConversionSpec};
use dhc_common::progress::{LogType, SharedProgressListener, no_op_progress_listener};
use dhc_common::remote_file::DownloadedBlob;
use dhc_drive::api::DriveApi;
use dhc_drive::downloader::ChunkedDownloader;
use dhc_drive::lister::HeicLister;

use crate::convert;
use crate::error::QueueError;

pub use summary::{BatchOutcome, BatchSummary, ItemReport};

/// What to do with the rest of the batch when one file's conversion fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Halt the whole batch at the first conversion failure.
    #[default]
    FailFast,
    /// Record the failure, report it, and keep going with the next candidate.
    SkipAndReport,
}

/// Drives the full list → download → convert pipeline for one folder.
pub struct ConversionQueue {
    api: Arc<dyn DriveApi>,
    spec: ConversionSpec,
    output_dir: PathBuf,
    policy: FailurePolicy,
    progress_listener: SharedProgressListener,
}

impl ConversionQueue {
    /// Set up the queue for one batch run.
    pub fn new(
        api: Arc<dyn DriveApi>,
        spec: ConversionSpec,
        output_dir: PathBuf,
        policy: FailurePolicy,
        progress_listener: Option<SharedProgressListener>,
    ) -> Self {
        let listener = progress_listener.unwrap_or_else(no_op_progress_listener);

        Self {
            api,
            spec,
            output_dir,
            policy,
            progress_listener: listener,
        }
    }

    /// Runs the batch.
    ///
    /// Only a listing failure is an `Err`; credential problems never reach
    /// this point and per-item problems terminate inside the returned
    /// [`BatchSummary`].
    pub async fn run(&self, folder_id: &str) -> Result<BatchSummary, QueueError> {
        let lister = HeicLister::new(self.api.clone());
        let downloader = ChunkedDownloader::new(self.api.clone());

        let candidates = lister.list_folder(folder_id).await?;

        if candidates.is_empty() {
            self.progress_listener.log_event(
                LogType::Info,
                folder_id,
                "No HEIC/HEIF files found in the specified folder",
            );
            self.progress_listener.main_done();
            return Ok(BatchSummary::empty());
        }

        self.progress_listener
            .set_main_total(candidates.len() as u64);
        self.progress_listener.log_event(
            LogType::Info,
            folder_id,
            &format!("Found {} HEIC/HEIF files to process", candidates.len()),
        );

        let mut reports: Vec<ItemReport> = Vec::with_capacity(candidates.len());
        let mut aborted: Option<(String, String)> = None;

        for candidate in &candidates {
            debug!("Processing {}", candidate.name);

            let blob = match downloader.download(candidate, &self.progress_listener).await {
                Ok(blob) => blob,
                Err(error) => {
                    self.progress_listener.log_event(
                        LogType::Error,
                        &candidate.name,
                        &error.to_string(),
                    );
                    aborted = Some((candidate.name.clone(), error.to_string()));
                    break;
                }
            };

            let outcome = self.convert_blob(blob).await;
            self.progress_listener.main_tick();

            match outcome {
                ConversionOutcome::Success { output_path } => {
                    self.progress_listener.log_event(
                        LogType::Success,
                        &candidate.name,
                        &format!("converted to {}", output_path.display()),
                    );
                    reports.push(ItemReport {
                        file_name: candidate.name.clone(),
                        outcome: ConversionOutcome::Success { output_path },
                    });
                }
                ConversionOutcome::Failure { reason } => {
                    reports.push(ItemReport {
                        file_name: candidate.name.clone(),
                        outcome: ConversionOutcome::Failure {
                            reason: reason.clone(),
                        },
                    });

                    match self.policy {
                        FailurePolicy::FailFast => {
                            self.progress_listener.log_event(
                                LogType::Error,
                                &candidate.name,
                                &reason,
                            );
                            aborted = Some((candidate.name.clone(), reason));
                            break;
                        }
                        FailurePolicy::SkipAndReport => {
                            self.progress_listener.log_event(
                                LogType::Skip,
                                &candidate.name,
                                &reason,
                            );
                        }
                    }
                }
            }
        }

        self.progress_listener.main_done();

        let outcome = match aborted {
            Some((file_name, reason)) => BatchOutcome::Aborted { file_name, reason },
            None => BatchOutcome::Completed,
        };

        Ok(BatchSummary { reports, outcome })
    }

    /// Offloads the CPU-bound conversion to the blocking pool. A panicked
    /// conversion task becomes that item's failure, not a process abort.
    async fn convert_blob(&self, blob: DownloadedBlob) -> ConversionOutcome {
        let spec = self.spec;
        let output_dir = self.output_dir.clone();

        match spawn_blocking(move || convert::convert(&blob, spec, &output_dir)).await {
            Ok(outcome) => outcome,
            Err(error) => ConversionOutcome::Failure {
                reason: format!("conversion task failed: {error}"),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use tempfile::tempdir;

    use dhc_common::conversion::{
        ChromaSubsampling, ConversionOutcome, ConversionSpec, TargetFormat,
    };
    use dhc_common::remote_file::RemoteFile;
    use dhc_drive::DriveError;
    use dhc_drive::api::{DriveApi, FileChunk, FileListPage, FileResource};

    use super::{BatchOutcome, ConversionQueue, FailurePolicy};

    /// One-page scripted remote: listing order is the `files` order, file
    /// contents come from `blobs`, missing blobs fail their chunk requests.
    #[derive(Debug, Default)]
    struct ScriptedApi {
        files: Vec<RemoteFile>,
        blobs: HashMap<String, Vec<u8>>,
        chunk_calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DriveApi for ScriptedApi {
        async fn list_page(
            &self,
            _query: &str,
            _page_size: u32,
            _page_token: Option<&str>,
        ) -> Result<FileListPage, DriveError> {
            Ok(FileListPage {
                next_page_token: None,
                files: self
                    .files
                    .iter()
                    .map(|file| FileResource {
                        id: file.id.clone(),
                        name: file.name.clone(),
                        mime_type: file.mime_type.clone(),
                    })
                    .collect(),
            })
        }

        async fn fetch_chunk(
            &self,
            file_id: &str,
            offset: u64,
            len: u64,
        ) -> Result<FileChunk, DriveError> {
            self.chunk_calls.lock().unwrap().push(file_id.to_string());

            let blob = self
                .blobs
                .get(file_id)
                .ok_or_else(|| DriveError::ChunkRequestFailed {
                    message: "404 Not Found".to_string(),
                })?;

            let total = blob.len() as u64;
            let end = (offset + len).min(total) as usize;

            Ok(FileChunk {
                data: blob[offset as usize..end].to_vec(),
                total_size: Some(total),
                is_last: end as u64 >= total,
            })
        }
    }

    fn remote(id: &str) -> RemoteFile {
        RemoteFile {
            id: id.to_string(),
            name: format!("{id}.heic"),
            mime_type: "image/heic".to_string(),
        }
    }

    fn png_bytes() -> Vec<u8> {
        let image = RgbImage::from_pixel(6, 6, Rgb([120, 10, 220]));
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    fn spec() -> ConversionSpec {
        ConversionSpec::new(TargetFormat::Jpeg, 100, ChromaSubsampling::Best).unwrap()
    }

    fn queue(api: Arc<ScriptedApi>, output: std::path::PathBuf, policy: FailurePolicy) -> ConversionQueue {
        ConversionQueue::new(api, spec(), output, policy, None)
    }

    #[tokio::test]
    async fn empty_folder_completes_with_zero_conversions() {
        let dir = tempdir().unwrap();
        let api = Arc::new(ScriptedApi::default());

        let summary = queue(api, dir.path().to_path_buf(), FailurePolicy::FailFast)
            .run("folder")
            .await
            .unwrap();

        assert_eq!(summary.outcome, BatchOutcome::Empty);
        assert!(summary.reports.is_empty());
        assert_eq!(summary.converted_count(), 0);
    }

    #[tokio::test]
    async fn download_failure_mid_batch_aborts_and_leaves_the_tail_untouched() {
        let dir = tempdir().unwrap();
        let good = png_bytes();
        let api = Arc::new(ScriptedApi {
            files: vec![remote("a"), remote("b"), remote("c"), remote("d"), remote("e")],
            // "c" has no blob, so its first chunk request fails.
            blobs: HashMap::from([
                ("a".to_string(), good.clone()),
                ("b".to_string(), good.clone()),
                ("d".to_string(), good.clone()),
                ("e".to_string(), good),
            ]),
            ..Default::default()
        });

        let summary = queue(api.clone(), dir.path().to_path_buf(), FailurePolicy::FailFast)
            .run("folder")
            .await
            .unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert!(summary.reports.iter().all(|r| r.outcome.is_success()));

        let BatchOutcome::Aborted { file_name, .. } = &summary.outcome else {
            panic!("expected an aborted batch");
        };
        assert_eq!(file_name, "c.heic");

        // Items after the failure were never fetched.
        let calls = api.chunk_calls.lock().unwrap();
        assert!(!calls.iter().any(|id| id == "d" || id == "e"));
    }

    #[tokio::test]
    async fn fail_fast_stops_after_a_conversion_failure() {
        let dir = tempdir().unwrap();
        let api = Arc::new(ScriptedApi {
            files: vec![remote("a"), remote("b"), remote("c")],
            blobs: HashMap::from([
                ("a".to_string(), png_bytes()),
                // "b" downloads fine but is not an image.
                ("b".to_string(), vec![0xBA, 0xD0, 0xBA, 0xD0]),
                ("c".to_string(), png_bytes()),
            ]),
            ..Default::default()
        });

        let summary = queue(api.clone(), dir.path().to_path_buf(), FailurePolicy::FailFast)
            .run("folder")
            .await
            .unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.converted_count(), 1);
        assert_eq!(summary.failed_count(), 1);

        let BatchOutcome::Aborted { file_name, reason } = &summary.outcome else {
            panic!("expected an aborted batch");
        };
        assert_eq!(file_name, "b.heic");
        assert!(reason.starts_with("decode error"), "reason: {reason}");

        let calls = api.chunk_calls.lock().unwrap();
        assert!(!calls.iter().any(|id| id == "c"));
    }

    #[tokio::test]
    async fn skip_and_report_continues_past_a_conversion_failure() {
        let dir = tempdir().unwrap();
        let api = Arc::new(ScriptedApi {
            files: vec![remote("a"), remote("b"), remote("c")],
            blobs: HashMap::from([
                ("a".to_string(), png_bytes()),
                ("b".to_string(), vec![0xBA, 0xD0, 0xBA, 0xD0]),
                ("c".to_string(), png_bytes()),
            ]),
            ..Default::default()
        });

        let summary = queue(
            api,
            dir.path().to_path_buf(),
            FailurePolicy::SkipAndReport,
        )
        .run("folder")
        .await
        .unwrap();

        assert_eq!(summary.outcome, BatchOutcome::Completed);
        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.converted_count(), 2);
        assert_eq!(summary.failed_count(), 1);
        assert!(matches!(
            summary.reports[1].outcome,
            ConversionOutcome::Failure { .. }
        ));
    }

    #[tokio::test]
    async fn successful_batch_writes_every_output() {
        let dir = tempdir().unwrap();
        let api = Arc::new(ScriptedApi {
            files: vec![remote("a"), remote("b")],
            blobs: HashMap::from([
                ("a".to_string(), png_bytes()),
                ("b".to_string(), png_bytes()),
            ]),
            ..Default::default()
        });

        let summary = queue(api, dir.path().to_path_buf(), FailurePolicy::FailFast)
            .run("folder")
            .await
            .unwrap();

        assert_eq!(summary.outcome, BatchOutcome::Completed);
        assert_eq!(summary.converted_count(), 2);
        assert!(dir.path().join("a.jpeg").exists());
        assert!(dir.path().join("b.jpeg").exists());
    }
}
