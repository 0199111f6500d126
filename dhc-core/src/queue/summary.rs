use dhc_common::conversion::ConversionOutcome;

/// Result of one candidate that reached the conversion stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub file_name: String,
    pub outcome: ConversionOutcome,
}

/// How the batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The listing matched nothing; no work was attempted.
    Empty,
    /// Every candidate was processed.
    Completed,
    /// The batch halted early. Carries the offending file and a
    /// human-readable reason; this is a terminal diagnostic, not an error.
    Aborted { file_name: String, reason: String },
}

/// In-memory report of one batch invocation. Nothing here outlives the run:
/// there is no checkpoint to resume from, a re-run starts over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Per-item results, in listing order.
    pub reports: Vec<ItemReport>,
    pub outcome: BatchOutcome,
}

impl BatchSummary {
    pub(crate) const fn empty() -> Self {
        Self {
            reports: Vec::new(),
            outcome: BatchOutcome::Empty,
        }
    }

    /// Number of files converted and written successfully.
    #[must_use]
    pub fn converted_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.outcome.is_success())
            .count()
    }

    /// Number of files whose conversion failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.reports.len() - self.converted_count()
    }

    #[inline]
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Aborted { .. })
    }
}
