#![deny(clippy::all)]
use clap::Parser;
use color_eyre::eyre::Result;
use color_eyre::owo_colors::OwoColorize;
use dhc_cli::cli::Cli;
use dhc_cli::progress_bars::IndicatifProgressHandler;
use dhc_core::queue::{BatchOutcome, BatchSummary, ConversionQueue};
use dhc_drive::api::DriveHttpClient;
use dhc_drive::auth::ServiceAccountKey;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    env_logger::builder().format_timestamp(None).init();
    color_eyre::install()?;

    // Credential problems are fatal before any listing happens.
    let key = match &args.credentials {
        Some(path) => ServiceAccountKey::from_file(path)?,
        None => ServiceAccountKey::from_env()?,
    };
    let client = DriveHttpClient::authenticate(&key).await?;

    let spec = args.conversion_spec()?;
    let progress_handler = Arc::new(IndicatifProgressHandler::new(0));

    let queue = ConversionQueue::new(
        Arc::new(client),
        spec,
        args.output.clone(),
        *args.on_error,
        Some(progress_handler),
    );

    let summary = queue.run(&args.folder_id).await?;

    print_results(&summary);

    Ok(())
}

fn print_results(summary: &BatchSummary) {
    if summary.outcome == BatchOutcome::Empty {
        // The "no candidates" line already went through the progress handler.
        return;
    }

    println!(
        "{} {} {}",
        summary.converted_count().to_string().bold().blue(),
        "files".bold().blue(),
        "converted".bold()
    );

    if summary.failed_count() > 0 {
        println!(
            "{} {}",
            summary.failed_count().to_string().bold().red(),
            "files failed to convert.".bold().red()
        );
    }

    if let BatchOutcome::Aborted { file_name, reason } = &summary.outcome {
        println!(
            "{} {} {}",
            "Batch aborted at".bold().red(),
            file_name.bold(),
            format!("({reason})").red()
        );
    }
}
