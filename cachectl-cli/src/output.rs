//! Output formatting for CLI commands
//!
//! Human output renders listings as a bordered table and batch results as
//! one summary line plus one block per failure. JSON output serializes the
//! same structures.

use cachectl::{BatchResult, ListingRow, Operation, PurgeReport, PurgeStep};
use clap::ValueEnum;
use serde::Serialize;
use shared::Result;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Everything a command can produce.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutput {
    Listing { rows: Vec<ListingRow> },
    Batch(BatchResult),
    Purge(PurgeReport),
}

impl CommandOutput {
    pub fn is_success(&self) -> bool {
        match self {
            CommandOutput::Listing { .. } => true,
            CommandOutput::Batch(result) => result.is_success(),
            CommandOutput::Purge(report) => report.is_success(),
        }
    }
}

pub fn render(output: &CommandOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(output)?),
        OutputFormat::Human => Ok(match output {
            CommandOutput::Listing { rows } => format_listing(rows),
            CommandOutput::Batch(result) => format_batch(result),
            CommandOutput::Purge(report) => format_purge(report),
        }),
    }
}

pub fn format_listing(rows: &[ListingRow]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.clone(),
                row.status.to_string(),
                row.validity.to_string(),
                row.cache_type.clone(),
            ]
        })
        .collect();
    render_table(&["Cache ID", "Status", "State", "Type"], &rows)
}

pub fn format_batch(result: &BatchResult) -> String {
    let mut lines = Vec::new();

    if result.operation.is_single_shot() {
        if result.is_success() {
            lines.push(single_shot_message(result.operation).to_string());
        }
        for failure in &result.failures {
            lines.push(format!("Exception:\n{}", failure.message));
        }
        return lines.join("\n");
    }

    let verb = result.operation.verb();
    if result.unchanged > 0 && matches!(result.operation, Operation::Enable | Operation::Disable) {
        lines.push(format!(
            "{} cache type(s) {}, {} already {}.",
            result.changed, verb, result.unchanged, verb
        ));
    } else {
        lines.push(format!("{} cache type(s) {}.", result.changed, verb));
    }

    if let Some(ref message) = result.persist_error {
        lines.push(format!("Nothing was {}: {}", verb, message));
    } else {
        for failure in &result.failures {
            lines.push(format!("{} cache error:\n{}", failure.id, failure.message));
        }
    }

    lines.join("\n")
}

pub fn format_purge(report: &PurgeReport) -> String {
    report
        .steps
        .iter()
        .map(|step| format!("[{}] {}", step_name(step.step), format_batch(&step.result)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn step_name(step: PurgeStep) -> &'static str {
    match step {
        PurgeStep::Refresh => "refresh",
        PurgeStep::Images => "images",
        PurgeStep::Media => "media",
        PurgeStep::TaggedCache => "magento",
        PurgeStep::Storage => "storage",
    }
}

fn single_shot_message(operation: Operation) -> &'static str {
    match operation {
        Operation::FlushStorage => "The cache storage has been flushed.",
        Operation::CleanTaggedCache => "The cache has been cleaned.",
        Operation::CleanMediaCache => "The JavaScript/CSS cache has been cleaned.",
        Operation::CleanImagesCache => "The image cache has been cleaned.",
        _ => "Done.",
    }
}

/// Render rows as a bordered table sized to its widest cells.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| format!(" {:<width$} ", cells.get(i).copied().unwrap_or(""), width = w))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut out = vec![border.clone(), line(headers.to_vec()), border.clone()];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.push(border);
    out.join("\n")
}
