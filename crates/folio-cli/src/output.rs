//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use folio_domain::Chunk;
use folio_extractor::{ChunkStrategy, DocumentState, DocumentStatus, RunOutcome, RunReport, SourceProfile};
use folio_store::ArtifactLayout;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format document progress along with the artifact paths from `layout`.
    pub fn format_statuses(
        &self,
        statuses: &[DocumentStatus],
        layout: &ArtifactLayout,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = statuses
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "document": s.document.as_str(),
                            "chunks": s.chunk_count,
                            "cursor": s.cursor,
                            "state": s.state.to_string(),
                            "table": layout.table_path(&s.document),
                            "checkpoint": layout.checkpoint_path(&s.document),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Table => {
                if statuses.is_empty() {
                    return Ok(self.colorize("No documents.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Document", "Chunks", "Cursor", "State", "Table", "Checkpoint"]);
                for status in statuses {
                    builder.push_record([
                        status.document.to_string(),
                        status.chunk_count.to_string(),
                        status.cursor.to_string(),
                        self.state_label(status.state),
                        layout.table_path(&status.document).display().to_string(),
                        layout.checkpoint_path(&status.document).display().to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the chunk plan of one document.
    pub fn format_chunks(&self, chunks: &[Chunk], preview_chars: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = chunks
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "index": c.index,
                            "start": c.span.start,
                            "end": c.span.end,
                            "chars": c.char_len(),
                            "blank": c.blank,
                            "preview": c.preview(preview_chars),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks (empty document).", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Span", "Chars", "Blank", "Preview"]);
                for chunk in chunks {
                    builder.push_record([
                        chunk.index.to_string(),
                        format!("{}..{}", chunk.span.start, chunk.span.end),
                        chunk.char_len().to_string(),
                        if chunk.blank { "yes" } else { "" }.to_string(),
                        one_line(&chunk.preview(preview_chars)),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the list of available profiles.
    pub fn format_profiles(&self, profiles: &[(SourceProfile, bool)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = profiles
                    .iter()
                    .map(|(p, configured)| {
                        serde_json::json!({
                            "name": p.name,
                            "source": if *configured { "config" } else { "built-in" },
                            "chunking": describe_strategy(&p.chunk_strategy),
                            "suffix": p.artifact_suffix,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Profile", "Source", "Chunking", "Noise", "Suffix"]);
                for (profile, configured) in profiles {
                    builder.push_record([
                        profile.name.clone(),
                        if *configured { "config" } else { "built-in" }.to_string(),
                        describe_strategy(&profile.chunk_strategy),
                        profile.noise_patterns.len().to_string(),
                        profile.artifact_suffix.clone(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the summary of a document run.
    pub fn run_summary(&self, report: &RunReport) -> String {
        match report.outcome {
            RunOutcome::AlreadyComplete => self.warning(&format!(
                "{}: already complete ({} chunks); reset it to process it again",
                report.document, report.chunk_count
            )),
            RunOutcome::Completed => {
                let mut message = format!(
                    "{}: {} row(s) from {} chunk(s)",
                    report.document, report.rows_appended, report.chunks_processed
                );
                if report.start_cursor > 0 {
                    message.push_str(&format!(", resumed at chunk {}", report.start_cursor + 1));
                }
                if report.blank_skipped > 0 {
                    message.push_str(&format!(", {} blank", report.blank_skipped));
                }
                if report.empty_chunks > 0 {
                    message.push_str(&format!(", {} without entries", report.empty_chunks));
                }
                if report.rows_without_data > 0 {
                    message.push_str(&format!(", {} row(s) all N/A", report.rows_without_data));
                }
                self.success(&message)
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn state_label(&self, state: DocumentState) -> String {
        let label = state.to_string();
        match state {
            DocumentState::Fresh => label,
            DocumentState::InProgress => self.colorize(&label, "cyan"),
            DocumentState::Complete => self.colorize(&label, "green"),
            DocumentState::Ahead => self.colorize(&label, "red"),
        }
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Short description of a chunking strategy.
pub fn describe_strategy(strategy: &ChunkStrategy) -> String {
    match strategy {
        ChunkStrategy::PageWindow { pages_per_chunk, .. } => {
            format!("{} page(s) per chunk", pages_per_chunk)
        }
        ChunkStrategy::SemanticBoundary { pattern, target_chars } => {
            format!("boundary {} / {} chars", pattern, target_chars)
        }
        ChunkStrategy::CharWindow { max_chars } => format!("{} chars", max_chars),
    }
}

fn one_line(text: &str) -> String {
    text.replace(['\n', '\u{000C}'], "⏎").replace('\t', " ")
}
