//! Terminal-independent description of what the results pane and the detail
//! overlay show. The ratatui adapter in `results.rs` only maps styles.

use serde_json::Value;

use crate::session::pages::ResultsView;
use crate::session::results::{ResultRecord, ScoreSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderLine {
    Summary {
        succeeded: usize,
        failed: usize,
    },
    /// One result, numbered across all pages.
    Item {
        number: usize,
        name: String,
        success: bool,
        selected: bool,
    },
    /// Compact rating summary under a successful item.
    Headline(String),
    Error(String),
    Field {
        label: &'static str,
        value: String,
    },
    Score {
        category: String,
        score: f64,
    },
    Text(String),
    Blank,
    Pager {
        page: usize,
        total_pages: usize,
        has_previous: bool,
        has_next: bool,
    },
    Empty(&'static str),
}

/// Lines for the current results page. `all` is the full record list (for
/// the counts line); `selected` is the highlighted row on this page, if the
/// pane has focus.
pub fn results_lines(
    all: &[ResultRecord],
    view: &ResultsView<'_>,
    rich: bool,
    selected: Option<usize>,
) -> Vec<RenderLine> {
    if view.is_empty() {
        return vec![RenderLine::Empty("No results yet")];
    }

    let succeeded = all.iter().filter(|r| r.is_success()).count();
    let mut lines = vec![
        RenderLine::Summary {
            succeeded,
            failed: all.len() - succeeded,
        },
        RenderLine::Blank,
    ];

    for (i, record) in view.records.iter().enumerate() {
        lines.push(RenderLine::Item {
            number: view.offset + i + 1,
            name: record.source_file_name().to_string(),
            success: record.is_success(),
            selected: selected == Some(i),
        });
        match record {
            ResultRecord::Success { .. } if rich => {
                if let Some(summary) = record.summary() {
                    lines.push(RenderLine::Headline(headline(&summary)));
                }
            }
            ResultRecord::Success { .. } => {}
            ResultRecord::Failure { error_message, .. } => {
                lines.push(RenderLine::Error(error_message.clone()));
            }
        }
    }

    if view.total_pages > 1 {
        lines.push(RenderLine::Blank);
        lines.push(RenderLine::Pager {
            page: view.page,
            total_pages: view.total_pages,
            has_previous: view.has_previous(),
            has_next: view.has_next(),
        });
    }
    lines
}

/// Everything known about one record, for the detail overlay.
pub fn detail_lines(record: &ResultRecord) -> Vec<RenderLine> {
    let mut lines = vec![
        RenderLine::Field {
            label: "File",
            value: record.source_file_name().to_string(),
        },
        RenderLine::Field {
            label: "Status",
            value: if record.is_success() { "Success" } else { "Failed" }.to_string(),
        },
    ];

    match record {
        ResultRecord::Failure { error_message, .. } => {
            lines.push(RenderLine::Field {
                label: "Error",
                value: error_message.clone(),
            });
        }
        ResultRecord::Success { score_metadata, .. } => match record.summary() {
            Some(summary) => push_summary(&mut lines, &summary),
            None => {
                lines.push(RenderLine::Blank);
                let raw = serde_json::to_string_pretty(score_metadata)
                    .unwrap_or_else(|_| score_metadata.to_string());
                lines.extend(raw.lines().map(|l| RenderLine::Text(l.to_string())));
            }
        },
    }
    lines
}

fn push_summary(lines: &mut Vec<RenderLine>, summary: &ScoreSummary) {
    let meta = &summary.metadata;
    lines.push(RenderLine::Field {
        label: "Total score",
        value: format_score(meta.total_score),
    });
    if let Some(kind) = &meta.paper_type {
        lines.push(RenderLine::Field {
            label: "Paper type",
            value: kind.clone(),
        });
    }
    if meta.confidence > 0.0 {
        lines.push(RenderLine::Field {
            label: "Confidence",
            value: format!("{:.0}%", summary.confidence_percent()),
        });
    }
    if !meta.keywords.is_empty() {
        lines.push(RenderLine::Field {
            label: "Keywords",
            value: meta.keywords.join(", "),
        });
    }

    if !summary.scores.is_empty() {
        lines.push(RenderLine::Blank);
        for score in &summary.scores {
            lines.push(RenderLine::Score {
                category: score.category.clone(),
                score: score.score,
            });
            if !score.rationale.is_empty() {
                lines.push(RenderLine::Text(score.rationale.clone()));
            }
        }
    }

    if !meta.comments.is_empty() {
        lines.push(RenderLine::Blank);
        lines.push(RenderLine::Field {
            label: "Comments",
            value: String::new(),
        });
        lines.extend(meta.comments.iter().map(|c| RenderLine::Text(format!("- {}", c))));
    }

    if !meta.penalties.is_empty() {
        lines.push(RenderLine::Blank);
        lines.push(RenderLine::Field {
            label: "Penalties",
            value: String::new(),
        });
        lines.extend(meta.penalties.iter().map(|p| {
            let text = match p {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            RenderLine::Text(format!("- {}", text))
        }));
    }
}

fn headline(summary: &ScoreSummary) -> String {
    let meta = &summary.metadata;
    let mut parts = vec![format!("Score {}", format_score(meta.total_score))];
    if let Some(kind) = &meta.paper_type {
        parts.push(kind.clone());
    }
    if meta.confidence > 0.0 {
        parts.push(format!("{:.0}% confidence", summary.confidence_percent()));
    }
    parts.join(" · ")
}

/// Whole numbers without decimals, everything else to one place.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}
