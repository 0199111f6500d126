// Terminal rendering of the progress listener traits using `indicatif`.
use dhc_common::progress::{DownloadProgressUpdater, LogType, ProgressListener};
use indicatif::{
    HumanBytes, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle,
};
use owo_colors::OwoColorize;
use std::{fmt::Write, time::Duration};

const PROGRESS_CHARS: &str = "━━";

const MAIN_TEMPLATE: &str = "{spinner:.green.bold} {elapsed_precise:.bold} {wide_bar:.green/white.dim} {percent:.bold}  {pos:.green} (eta. {eta:.blue})";
const DOWNLOAD_TEMPLATE: &str = "{spinner:.green.bold} {bar:40.green/white.dim} {percent:.bold} | {byte_progress:21.green} @ {bytes_per_sec:>13.red} (eta. {eta:<4.blue})";

/// Handles CLI progress display using `indicatif`.
///
/// One main bar counts candidates; each download gets its own transient byte
/// bar underneath it.
#[derive(Debug)]
pub struct IndicatifProgressHandler {
    main_bar: ProgressBar,
    multi_pb: MultiProgress,
}

impl IndicatifProgressHandler {
    /// Initialize the main progress bar.
    ///
    /// The total is usually unknown at construction and set later through
    /// [`ProgressListener::set_main_total`].
    pub fn new(initial_len: u64) -> Self {
        let bar = ProgressBar::new(initial_len).with_style(master_progress_style());
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));

        let multi = MultiProgress::new();
        let main = multi.add(bar);

        Self {
            main_bar: main,
            multi_pb: multi,
        }
    }
}

#[derive(Debug)]
struct IndicatifDownloadProgressUpdater {
    bar: ProgressBar,
}

impl DownloadProgressUpdater for IndicatifDownloadProgressUpdater {
    fn set_progress(&self, bytes_downloaded: u64) {
        self.bar.set_position(bytes_downloaded);
    }

    fn set_total_size(&self, total_size: u64) {
        if self.bar.length() != Some(total_size) {
            self.bar.set_length(total_size);
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressListener for IndicatifProgressHandler {
    fn set_main_total(&self, total: u64) {
        self.main_bar.set_length(total);
    }

    fn main_tick(&self) {
        self.main_bar.inc(1);
    }

    fn main_done(&self) {
        self.main_bar.finish_and_clear();
    }

    fn add_download_task(
        &self,
        name: String,
        total_size: Option<u64>,
    ) -> Box<dyn DownloadProgressUpdater> {
        let pb = ProgressBar::new(total_size.unwrap_or(0))
            .with_style(download_progress_style())
            .with_message(name);
        pb.set_draw_target(ProgressDrawTarget::stderr());

        let managed_pb = self.multi_pb.add(pb);

        Box::new(IndicatifDownloadProgressUpdater { bar: managed_pb })
    }

    fn log_event(&self, log_type: LogType, target: &str, message: &str) {
        let formatted_message = match log_type {
            LogType::Info => format!("{} {}", target.bold(), message),
            LogType::Success => {
                format!("{} {}", target.blue().italic(), message.green().bold())
            }
            LogType::Skip => {
                format!(
                    "{} {} {}",
                    target.blue().italic(),
                    message.yellow().bold(),
                    "Skipping...".yellow().bold()
                )
            }
            LogType::Warning => format!(
                "{} {} {}",
                target.blue().italic(),
                message.yellow().bold(),
                "Warning.".yellow().bold()
            ),
            LogType::Error => format!(
                "{} {} {}",
                target.blue().italic(),
                message.red().bold(),
                "Error.".red().bold()
            ),
        };

        self.main_bar.println(formatted_message);
    }
}

fn master_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(MAIN_TEMPLATE)
        .unwrap()
        .with_key("pos", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{}/{}", state.pos(), state.len().unwrap_or(0)).unwrap();
        })
        .with_key("percent", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{:>3.0}%", state.fraction() * 100_f32).unwrap();
        })
        .progress_chars(PROGRESS_CHARS)
}

fn download_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(DOWNLOAD_TEMPLATE)
        .unwrap()
        .with_key("percent", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{:>3.0}%", state.fraction() * 100_f32).unwrap();
        })
        .with_key(
            "byte_progress",
            |state: &ProgressState, w: &mut dyn Write| {
                write!(
                    w,
                    "{}/{}",
                    HumanBytes(state.pos()),
                    HumanBytes(state.len().unwrap_or(0))
                )
                .unwrap();
            },
        )
        .progress_chars(PROGRESS_CHARS)
}
