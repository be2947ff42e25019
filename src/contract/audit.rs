// src/contract/audit.rs
//! Checks the base contract leaves alone.
//!
//! The contract accepts `score > score_max` and a batch `total` that
//! disagrees with its `results`. Whether a server doing that is buggy or
//! just permissive is not settled, so these are reported as findings and
//! the caller decides how strict to be.

use super::{BatchGradingResponse, GradeOutcome, GradingResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    ScoreExceedsMax { path: String, score: f64, score_max: f64 },
    NegativeScoreMax { path: String, score_max: f64 },
    TotalMismatch { total: u64, results: usize },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::ScoreExceedsMax { path, score, score_max } => {
                write!(f, "{path}: score {score} exceeds score_max {score_max}")
            }
            Finding::NegativeScoreMax { path, score_max } => {
                write!(f, "{path}: score_max {score_max} is negative")
            }
            Finding::TotalMismatch { total, results } => {
                write!(f, "$.total: reports {total} but results holds {results}")
            }
        }
    }
}

pub fn grading_result(result: &GradingResult) -> Vec<Finding> {
    scores_at("$", result)
}

pub fn batch(response: &BatchGradingResponse) -> Vec<Finding> {
    let mut findings = Vec::new();
    if response.total != response.results.len() as u64 {
        findings.push(Finding::TotalMismatch {
            total: response.total,
            results: response.results.len(),
        });
    }
    for (idx, outcome) in response.results.iter().enumerate() {
        if let GradeOutcome::Success(result) = outcome {
            findings.extend(scores_at(&format!("$.results[{idx}]"), result));
        }
    }
    findings
}

fn scores_at(prefix: &str, result: &GradingResult) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (idx, item) in result.criteria_feedback.iter().enumerate() {
        let path = format!("{prefix}.criteria_feedback[{idx}]");
        if item.score_max < 0.0 {
            findings.push(Finding::NegativeScoreMax { path: path.clone(), score_max: item.score_max });
        }
        if item.score > item.score_max {
            findings.push(Finding::ScoreExceedsMax {
                path,
                score: item.score,
                score_max: item.score_max,
            });
        }
    }
    findings
}
