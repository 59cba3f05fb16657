use serde::Deserialize;
use serde_json::Value;

pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const UNKNOWN_FILE: &str = "Unknown file";
/// Source name of the single record produced when the whole batch was rejected.
pub const BATCH_SOURCE: &str = "Upload";

/// Normalized outcome for one submitted file.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRecord {
    Success {
        source_file_name: String,
        /// The server's `result` object, passed through untouched.
        score_metadata: Value,
    },
    Failure {
        source_file_name: String,
        error_message: String,
    },
}

impl ResultRecord {
    pub fn source_file_name(&self) -> &str {
        match self {
            Self::Success { source_file_name, .. } | Self::Failure { source_file_name, .. } => {
                source_file_name
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn score_metadata(&self) -> Option<&Value> {
        match self {
            Self::Success { score_metadata, .. } => Some(score_metadata),
            Self::Failure { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_message, .. } => Some(error_message),
        }
    }

    /// Lenient decode of the rating summary. `None` when the metadata does
    /// not look like a rating at all.
    pub fn summary(&self) -> Option<ScoreSummary> {
        self.score_metadata().and_then(ScoreSummary::from_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub records: Vec<ResultRecord>,
    pub overall_status: OverallStatus,
    /// Human readable summary sent by the server, if any.
    pub message: Option<String>,
}

impl Interpretation {
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}

/// Map a response body from `/api/rate/upload` to result records.
///
/// Never fails: missing or mistyped fields fall back to defaults.
pub fn interpret(payload: &Value) -> Interpretation {
    let message = str_field(payload, "message").map(str::to_string);

    if payload.get("success").and_then(Value::as_bool) != Some(true) {
        let error_message = str_field(payload, "error").unwrap_or(UNKNOWN_ERROR).to_string();
        return Interpretation {
            records: vec![ResultRecord::Failure {
                source_file_name: BATCH_SOURCE.to_string(),
                error_message,
            }],
            overall_status: OverallStatus::Failed,
            message,
        };
    }

    let results = payload.pointer("/data/results");
    let successful = results
        .and_then(|r| r.get("successful"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let failed = results
        .and_then(|r| r.get("failed"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let successes = successful.iter().map(|entry| ResultRecord::Success {
        source_file_name: str_field(entry, "file_path")
            .map(last_segment)
            .unwrap_or(UNKNOWN_FILE)
            .to_string(),
        score_metadata: entry.get("result").cloned().unwrap_or(Value::Null),
    });
    // Older servers report whole-file failures under `file` instead of `file_path`.
    let failures = failed.iter().map(|entry| ResultRecord::Failure {
        source_file_name: str_field(entry, "file_path")
            .or_else(|| str_field(entry, "file"))
            .unwrap_or(UNKNOWN_FILE)
            .to_string(),
        error_message: str_field(entry, "error").unwrap_or(UNKNOWN_ERROR).to_string(),
    });

    Interpretation {
        records: successes.chain(failures).collect(),
        overall_status: OverallStatus::Complete,
        message,
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Last segment of a server-side path; handles both separators.
fn last_segment(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

// ---------------------------------------------------------------------------
// Rating summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CategoryScore {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingMetadata {
    pub total_score: f64,
    pub confidence: f64,
    pub paper_type: Option<String>,
    #[serde(rename = "Keywords", alias = "keywords")]
    pub keywords: Vec<String>,
    pub comments: Vec<String>,
    pub penalties: Vec<Value>,
}

/// Typed view of a rating result. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreSummary {
    pub scores: Vec<CategoryScore>,
    pub metadata: RatingMetadata,
}

impl ScoreSummary {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Confidence as a percentage; the rater reports either 0–1 or 0–100.
    pub fn confidence_percent(&self) -> f64 {
        let c = self.metadata.confidence;
        if c <= 1.0 {
            c * 100.0
        } else {
            c
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unsuccessful_payload_yields_single_failure() {
        let out = interpret(&json!({"success": false, "error": "boom"}));
        assert_eq!(out.overall_status, OverallStatus::Failed);
        assert_eq!(
            out.records,
            vec![ResultRecord::Failure {
                source_file_name: BATCH_SOURCE.to_string(),
                error_message: "boom".to_string(),
            }]
        );
    }

    #[test]
    fn unsuccessful_payload_without_error_uses_fallback() {
        let out = interpret(&json!({"success": false}));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].error_message(), Some(UNKNOWN_ERROR));

        let out = interpret(&json!("not even an object"));
        assert_eq!(out.overall_status, OverallStatus::Failed);
        assert_eq!(out.records[0].error_message(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn mixed_payload_orders_successes_first() {
        let out = interpret(&json!({
            "success": true,
            "data": {"results": {
                "successful": [{"file_path": "a/b.pdf", "result": {}}],
                "failed": [{"file_path": "c.pdf", "error": "bad"}]
            }}
        }));

        assert_eq!(out.overall_status, OverallStatus::Complete);
        assert_eq!(
            out.records,
            vec![
                ResultRecord::Success {
                    source_file_name: "b.pdf".to_string(),
                    score_metadata: json!({}),
                },
                ResultRecord::Failure {
                    source_file_name: "c.pdf".to_string(),
                    error_message: "bad".to_string(),
                },
            ]
        );
        assert_eq!((out.succeeded(), out.failed()), (1, 1));
    }

    #[test]
    fn input_order_is_kept_within_each_group() {
        let out = interpret(&json!({
            "success": true,
            "data": {"results": {
                "failed": [{"file_path": "f1"}, {"file_path": "f2"}],
                "successful": [
                    {"file_path": "temp_uploads/s1.pdf"},
                    {"file_path": "C:\\up\\s2.pdf"}
                ]
            }}
        }));
        let names: Vec<&str> = out.records.iter().map(|r| r.source_file_name()).collect();
        assert_eq!(names, ["s1.pdf", "s2.pdf", "f1", "f2"]);
    }

    #[test]
    fn missing_fields_fall_back() {
        let out = interpret(&json!({
            "success": true,
            "message": "Processed 0 file(s) successfully, 2 failed",
            "data": {"results": {
                "successful": "not an array",
                "failed": [{}, {"file": "legacy.pdf", "error": 7}]
            }}
        }));
        assert_eq!(out.overall_status, OverallStatus::Complete);
        assert_eq!(
            out.message.as_deref(),
            Some("Processed 0 file(s) successfully, 2 failed")
        );
        assert_eq!(
            out.records,
            vec![
                ResultRecord::Failure {
                    source_file_name: UNKNOWN_FILE.to_string(),
                    error_message: UNKNOWN_ERROR.to_string(),
                },
                ResultRecord::Failure {
                    source_file_name: "legacy.pdf".to_string(),
                    error_message: UNKNOWN_ERROR.to_string(),
                },
            ]
        );
    }

    #[test]
    fn success_without_data_is_empty_and_complete() {
        let out = interpret(&json!({"success": true}));
        assert!(out.records.is_empty());
        assert_eq!(out.overall_status, OverallStatus::Complete);
    }

    #[test]
    fn success_without_result_keeps_null_metadata() {
        let out = interpret(&json!({
            "success": true,
            "data": {"results": {"successful": [{"file_path": "x.pdf"}]}}
        }));
        assert_eq!(out.records[0].score_metadata(), Some(&Value::Null));
        assert_eq!(out.records[0].summary(), None);
    }

    #[test]
    fn summary_decodes_rater_output() {
        let record = ResultRecord::Success {
            source_file_name: "p.pdf".to_string(),
            score_metadata: json!({
                "scores": [
                    {"category": "Study Design", "score": 15, "rationale": "randomized controlled trial"},
                    {"category": "Novelty", "score": 5}
                ],
                "metadata": {
                    "total_score": 89,
                    "confidence": 0.85,
                    "paper_type": "RCT",
                    "Keywords": ["oncology"],
                    "comments": ["solid"]
                }
            }),
        };
        let summary = record.summary().unwrap();
        assert_eq!(summary.scores.len(), 2);
        assert_eq!(summary.scores[1].rationale, "");
        assert_eq!(summary.metadata.total_score, 89.0);
        assert_eq!(summary.metadata.paper_type.as_deref(), Some("RCT"));
        assert_eq!(summary.metadata.keywords, ["oncology"]);
        assert!((summary.confidence_percent() - 85.0).abs() < 1e-9);
    }

    #[test]
    fn summary_rejects_mistyped_metadata() {
        let record = ResultRecord::Success {
            source_file_name: "p.pdf".to_string(),
            score_metadata: json!({"scores": "nope"}),
        };
        assert_eq!(record.summary(), None);
    }
}
