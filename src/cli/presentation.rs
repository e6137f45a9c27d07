//! Presentation: progress lines while the pipeline runs and the final run summary.

use crate::generation::{PipelineEvent, PipelineObserver, RunReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Prints `[i/N] name` progress lines on stdout.
pub struct ConsoleObserver {
    enabled: bool,
    color: bool,
}

impl ConsoleObserver {
    pub fn new(enabled: bool, color: bool) -> Self {
        Self { enabled, color }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn on_event(&self, event: &PipelineEvent) {
        if !self.enabled {
            return;
        }
        if let Some(line) = format_event(event, self.color) {
            println!("{}", line);
        }
    }
}

/// One progress line per event; `None` for events that only feed the summary.
pub fn format_event(event: &PipelineEvent, color: bool) -> Option<String> {
    match event {
        PipelineEvent::RunStarted {
            category,
            model,
            total_documents,
            eligible,
        } => Some(format!(
            "{}\n  Model: {}\n  Total files: {}\n  Need playgrounds: {}\n",
            heading(&format!("Generating playgrounds for {}", category), color),
            model,
            total_documents,
            eligible
        )),
        PipelineEvent::DocumentStarted {
            index, total, name, ..
        } => Some(format!("[{}/{}] {}", index, total, name)),
        PipelineEvent::AttemptFailed {
            name,
            attempt,
            max_attempts,
            reason,
            will_retry,
        } => {
            let line = if *will_retry {
                format!("  {}: attempt {}/{} failed: {}, retrying", name, attempt, max_attempts, reason)
            } else {
                format!("  {}: attempt {}/{} failed: {}", name, attempt, max_attempts, reason)
            };
            Some(if color { line.yellow().to_string() } else { line })
        }
        PipelineEvent::DocumentAppended {
            index,
            total,
            name,
            attempts,
            ..
        } => {
            let line = format!(
                "[{}/{}] {}: appended playground ({} attempt(s))",
                index, total, name, attempts
            );
            Some(if color { line.green().to_string() } else { line })
        }
        PipelineEvent::DocumentFailed {
            index,
            total,
            name,
            attempts,
            ..
        } => {
            let line = format!("[{}/{}] {}: skipped after {} attempt(s)", index, total, name, attempts);
            Some(if color { line.red().to_string() } else { line })
        }
        PipelineEvent::RunFinished { .. } => None,
    }
}

fn heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

/// Human-readable run summary.
pub fn format_report_text(report: &RunReport, color: bool) -> String {
    let mut out = String::new();

    if report.dry_run {
        out.push_str(&format!(
            "{}\n\n",
            heading(&format!("Dry run: {}", report.category), color)
        ));
        out.push_str(&format!("  Model: {}\n", report.model));
        out.push_str(&format!("  Total files: {}\n", report.total_documents));
        out.push_str(&format!("  Need playgrounds: {}\n", report.eligible));
        if !report.documents.is_empty() {
            out.push('\n');
            for path in &report.documents {
                out.push_str(&format!("  {}\n", path.display()));
            }
        }
        return out;
    }

    out.push_str(&format!("{}\n\n", heading("Summary", color)));
    out.push_str(&format!("  Succeeded: {}\n", report.succeeded));
    out.push_str(&format!("  Failed: {}\n", report.failed));
    if report.skipped > 0 {
        out.push_str(&format!("  Skipped: {}\n", report.skipped));
    }
    if let Some(ms) = report.duration_ms() {
        out.push_str(&format!("  Duration: {:.1}s\n", ms as f64 / 1000.0));
    }
    if report.cancelled {
        let note = "  Run cancelled before all documents were processed";
        out.push_str(&format!("{}\n", if color { note.yellow().to_string() } else { note.to_string() }));
    }

    if !report.failures.is_empty() {
        out.push_str(&format!("\n{}\n\n", heading("Failures", color)));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Document", "Attempts", "Reason"]);
        for failure in &report.failures {
            table.add_row(vec![
                failure.name.clone(),
                failure.attempts.to_string(),
                failure.reason.clone(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out
}

pub fn format_report_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ContentCategory;
    use crate::corpus::Document;
    use crate::extraction::BlockFormat;
    use crate::generation::{DocumentFailure, GenerationPlan};
    use std::path::PathBuf;

    fn plan() -> GenerationPlan {
        let documents = vec![
            Document::new(PathBuf::from("pages/js/loops.mdx"), "# Loops".into(), &BlockFormat::default()),
            Document::new(PathBuf::from("pages/js/arrays.mdx"), "# Arrays".into(), &BlockFormat::default()),
        ];
        GenerationPlan::new(ContentCategory::Javascript, 4, documents)
    }

    #[test]
    fn test_document_started_line() {
        let event = PipelineEvent::DocumentStarted {
            index: 2,
            total: 7,
            name: "loops.mdx".to_string(),
            path: PathBuf::from("pages/js/loops.mdx"),
        };
        assert_eq!(format_event(&event, false).unwrap(), "[2/7] loops.mdx");
    }

    #[test]
    fn test_run_finished_has_no_line() {
        let event = PipelineEvent::RunFinished {
            succeeded: 1,
            failed: 0,
            skipped: 0,
            cancelled: false,
        };
        assert!(format_event(&event, false).is_none());
    }

    #[test]
    fn test_retry_line_mentions_retrying() {
        let event = PipelineEvent::AttemptFailed {
            name: "loops.mdx".to_string(),
            attempt: 1,
            max_attempts: 3,
            reason: "no closing marker".to_string(),
            will_retry: true,
        };
        let line = format_event(&event, false).unwrap();
        assert!(line.starts_with("  loops.mdx: attempt 1/3"));
        assert!(line.ends_with("retrying"));
    }

    #[test]
    fn test_completion_lines_name_the_document() {
        let appended = PipelineEvent::DocumentAppended {
            index: 3,
            total: 7,
            name: "arrays".to_string(),
            path: PathBuf::from("pages/js/arrays.mdx"),
            attempts: 2,
        };
        assert_eq!(
            format_event(&appended, false).unwrap(),
            "[3/7] arrays: appended playground (2 attempt(s))"
        );

        let failed = PipelineEvent::DocumentFailed {
            index: 4,
            total: 7,
            name: "loops".to_string(),
            path: PathBuf::from("pages/js/loops.mdx"),
            attempts: 3,
            reason: "no closing marker".to_string(),
        };
        assert_eq!(
            format_event(&failed, false).unwrap(),
            "[4/7] loops: skipped after 3 attempt(s)"
        );
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut report = RunReport::new(&plan(), "gemini", "gemini-3.1-pro-preview");
        report.succeeded = 1;
        report.failed = 1;
        report.failures.push(DocumentFailure {
            path: PathBuf::from("pages/js/arrays.mdx"),
            name: "arrays.mdx".to_string(),
            attempts: 3,
            reason: "unterminated block".to_string(),
        });
        report.finish();

        let text = format_report_text(&report, false);
        assert!(text.contains("Succeeded: 1"));
        assert!(text.contains("Failed: 1"));
        assert!(text.contains("arrays.mdx"));
        assert!(text.contains("unterminated block"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_dry_run_lists_documents() {
        let report = RunReport::dry_run(&plan(), "gemini", "gemini-3.1-pro-preview");
        let text = format_report_text(&report, false);
        assert!(text.starts_with("Dry run: javascript"));
        assert!(text.contains("Need playgrounds: 2"));
        assert!(text.contains("loops.mdx"));
    }

    #[test]
    fn test_json_report_parses() {
        let report = RunReport::dry_run(&plan(), "gemini", "m");
        let value: serde_json::Value = serde_json::from_str(&format_report_json(&report)).unwrap();
        assert_eq!(value["category"], "javascript");
        assert_eq!(value["eligible"], 2);
    }
}
