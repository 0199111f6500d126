use std::ops::Deref;

use clap::ValueEnum;
use dhc_common::conversion::TargetFormat;
use dhc_core::queue::FailurePolicy;

pub mod cli;
pub mod progress_bars;

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct FormatArg(pub TargetFormat);

impl ValueEnum for FormatArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self(TargetFormat::Jpeg),
            Self(TargetFormat::Png),
            Self(TargetFormat::Webp),
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self.0 {
            TargetFormat::Jpeg => Some(
                clap::builder::PossibleValue::new("jpeg")
                    .help("Baseline JPEG with configurable quality and chroma subsampling"),
            ),
            TargetFormat::Png => Some(
                clap::builder::PossibleValue::new("png")
                    .help("Lossless PNG; the quality setting maps onto the compression level"),
            ),
            TargetFormat::Webp => Some(
                clap::builder::PossibleValue::new("webp")
                    .help("Lossy WEBP at the encoder's highest effort setting"),
            ),
        }
    }
}

impl Deref for FormatArg {
    type Target = TargetFormat;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct PolicyArg(pub FailurePolicy);

impl ValueEnum for PolicyArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self(FailurePolicy::FailFast),
            Self(FailurePolicy::SkipAndReport),
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self.0 {
            FailurePolicy::FailFast => Some(
                clap::builder::PossibleValue::new("fail-fast")
                    .help("Halt the whole batch at the first file that fails"),
            ),
            FailurePolicy::SkipAndReport => Some(
                clap::builder::PossibleValue::new("skip")
                    .help("Report the failed file and continue with the next one"),
            ),
        }
    }
}

impl Deref for PolicyArg {
    type Target = FailurePolicy;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
