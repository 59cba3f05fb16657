use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::results::ResultRecord;

/// Plain-text report of all results: one numbered entry per record with its
/// status, and the error for failures.
pub fn render_text(records: &[ResultRecord], generated_at: DateTime<Local>) -> String {
    let succeeded = records.iter().filter(|r| r.is_success()).count();
    let failed = records.len() - succeeded;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Rating results ({})",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(
        out,
        "{} file(s): {} succeeded, {} failed",
        records.len(),
        succeeded,
        failed
    );

    for (i, record) in records.iter().enumerate() {
        out.push('\n');
        match record {
            ResultRecord::Success { source_file_name, .. } => {
                let _ = write!(out, "{}. {} - SUCCESS", i + 1, source_file_name);
                if let Some(summary) = record.summary() {
                    let _ = write!(out, " (total score {})", summary.metadata.total_score);
                }
                out.push('\n');
            }
            ResultRecord::Failure {
                source_file_name,
                error_message,
            } => {
                let _ = writeln!(out, "{}. {} - FAILED", i + 1, source_file_name);
                let _ = writeln!(out, "   Error: {}", error_message);
            }
        }
    }
    out
}

/// Write the report into `dir` under a timestamped name and return its path.
pub fn write_report(
    dir: &Path,
    records: &[ResultRecord],
    generated_at: DateTime<Local>,
) -> std::io::Result<PathBuf> {
    let path = dir.join(format!(
        "rating-results-{}.txt",
        generated_at.format("%Y%m%d-%H%M%S")
    ));
    fs::write(&path, render_text(records, generated_at))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()
    }

    fn sample() -> Vec<ResultRecord> {
        vec![
            ResultRecord::Success {
                source_file_name: "b.pdf".to_string(),
                score_metadata: json!({"metadata": {"total_score": 89}}),
            },
            ResultRecord::Failure {
                source_file_name: "c.pdf".to_string(),
                error_message: "bad".to_string(),
            },
        ]
    }

    #[test]
    fn report_lists_status_and_errors() {
        let text = render_text(&sample(), at());
        let expected = "\
Rating results (2026-03-01 09:30:00)
2 file(s): 1 succeeded, 1 failed

1. b.pdf - SUCCESS (total score 89)

2. c.pdf - FAILED
   Error: bad
";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_report_has_only_header() {
        let text = render_text(&[], at());
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("0 file(s)"));
    }

    #[test]
    fn report_is_written_with_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(dir.path(), &sample(), at()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "rating-results-20260301-093000.txt"
        );
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("2. c.pdf - FAILED"));
    }
}
