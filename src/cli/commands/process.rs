//! Process command implementation.

use crate::cli::{format_duration, preflight, Output};
use crate::config::Settings;
use crate::pipeline::{LectureRecord, OriginalSize, Pipeline};
use crate::source::{parse_input, LectureRequest};
use anyhow::Result;

/// Run the process command: digest one lecture end to end.
pub async fn run_process(
    input: &str,
    title: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let source = parse_input(input)?;

    // Pre-flight checks
    if let Err(e) = preflight::check(&settings, source.is_remote()) {
        Output::error(&format!("{}", e));
        Output::info("Run 'notat doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let request = LectureRequest { source, title };

    Output::info(&format!("Processing: {}", input));

    let spinner = Output::spinner("Loading whisper model...");
    let pipeline = Pipeline::new(settings)?;
    spinner.finish_and_clear();

    let spinner = Output::spinner("Digesting (resolve, transcribe, summarize)...");
    let result = pipeline.process(&request).await;
    spinner.finish_and_clear();

    let record = match result {
        Ok(record) => record,
        Err(e) => {
            Output::error(&format!("Failed to process: {}", e));
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}

/// Pretty-print a finished lecture record.
fn print_record(record: &LectureRecord) {
    Output::success(&format!("Digested '{}'", record.title));

    Output::kv("Audio", &record.audio_path.display().to_string());
    if let Some(path) = &record.transcript_path {
        Output::kv("Transcript", &path.display().to_string());
    }
    if let Some(language) = &record.language {
        Output::kv("Language", language);
    }
    if let Some(duration) = record.duration_seconds {
        Output::kv("Duration", &format_duration(duration));
    }
    if let Some(published) = record.published_at {
        Output::kv("Published", &published.format("%Y-%m-%d").to_string());
    }

    Output::kv("New size", &format!("{:.2} MB", record.new_size_mb));
    match record.original_size {
        Some(OriginalSize::Measured(mb)) => {
            Output::kv("Original size", &format!("{:.2} MB", mb));
        }
        Some(OriginalSize::Estimated(mb)) => {
            Output::kv("Original size", &format!("~{:.2} MB (estimated)", mb));
        }
        None => {}
    }
    Output::kv("Data saved", &format!("{:.1}%", record.data_saved_percent()));

    if record.summary.is_fallback() {
        Output::warning("AI study guide unavailable; showing transcript preview instead.");
    }

    Output::header("Study Guide");
    println!("{}", record.summary.body());
}
