//! Record a session and export it.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use stepcast_capture_engine::{Recorder, RecorderConfig};
use stepcast_common::config::AppConfig;
use stepcast_common::error::StepcastError;
use stepcast_common::format::ExportFormat;
use stepcast_input_tracker::detect_input_source;
use stepcast_render_engine::{save, ExportOptions};

/// Command-line overrides for a recording.
pub struct RecordArgs {
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    pub tick_ms: Option<u64>,
    pub title: Option<String>,
    pub cover_page: bool,
}

pub async fn run(config: &AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    // Reject a bad format before anything is recorded.
    let format = match &args.format {
        Some(tag) => tag.parse::<ExportFormat>()?,
        None => config.output_format,
    };
    let output = args
        .output
        .unwrap_or_else(|| config.output_path(format, chrono::Local::now()));

    let mut recorder_config = RecorderConfig::from_defaults(&config.recording);
    if let Some(ms) = args.tick_ms {
        recorder_config.tick_interval = Duration::from_millis(ms.max(1));
    }

    let source = detect_input_source()?;
    let mut recorder = Recorder::new(source, recorder_config);

    println!("Starting recording");
    println!("  Output: {}", output.display());
    println!("  Format: {format}");
    println!("  Tick: {} ms", recorder.config().tick_interval.as_millis());
    println!();
    println!("Click through the workflow, then press Ctrl+C to stop...");
    println!();

    recorder.start()?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut progress = tokio::time::interval(Duration::from_millis(250));
    let mut shown = 0;
    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal?;
                break;
            }
            _ = progress.tick() => {
                let count = recorder.step_count();
                if count != shown {
                    shown = count;
                    print!("\r  Steps captured: {count}  ");
                    std::io::stdout().flush()?;
                }
            }
        }
    }

    println!();
    let steps = recorder.stop().await?;
    if steps.is_empty() {
        return Err(StepcastError::NoStepsRecorded.into());
    }
    println!("Recorded {} steps", steps.len());

    let mut options = ExportOptions::from_config(config);
    if let Some(title) = args.title {
        options.title = title;
    }
    options.cover_page = options.cover_page && args.cover_page;

    save(&steps, &output, format, &options)?;
    println!("Saved to: {}", output.display());

    Ok(())
}
