// src/mock.rs
//! Canned grading payloads for UI work and tests.

use crate::contract::{
    BatchGradingResponse, CriteriaFeedback, GradeFailure, GradeOutcome, GradingResult,
    HealthState, HealthStatus, SERVICE_NAME, ServiceInfo,
};

/// Default model name the grading server reports when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

fn criterion(title: &str, score: f64, score_max: f64, feedback: &str) -> CriteriaFeedback {
    CriteriaFeedback {
        criteria_title: title.to_string(),
        score,
        score_max,
        feedback: feedback.to_string(),
    }
}

fn graded(name: &str, overall: &str, criteria: Vec<CriteriaFeedback>) -> GradeOutcome {
    GradeOutcome::Success(GradingResult {
        name: name.to_string(),
        overall_feedback: overall.to_string(),
        criteria_feedback: criteria,
        images: None,
        ai_detection: None,
    })
}

pub fn service_info() -> ServiceInfo {
    ServiceInfo { service: SERVICE_NAME.to_string() }
}

pub fn health_status(gemini_configured: bool) -> HealthStatus {
    HealthStatus {
        status: HealthState::Ok,
        gemini_configured,
        model: DEFAULT_MODEL.to_string(),
    }
}

/// The failure body the server returns when grading throws.
pub fn grade_failure(detail: &str) -> GradeFailure {
    GradeFailure {
        name: None,
        message: "Grading failed".to_string(),
        detail: Some(detail.to_string()),
    }
}

/// A graded class of three, each scored on the same three criteria.
pub fn batch_response() -> BatchGradingResponse {
    let results = vec![
        graded(
            "John Doe",
            "Great job on the assignment! Your thesis was clear and your evidence was strong. Keep up the good work!",
            vec![
                criterion(
                    "Thesis Statement",
                    7.5,
                    8.0,
                    "Your thesis statement is clear and well-defined. It sets a strong foundation for your assignment.",
                ),
                criterion(
                    "Evidence and Support",
                    14.0,
                    20.0,
                    "You provided some good examples, but consider adding more specific citations to strengthen your arguments.",
                ),
                criterion(
                    "Organization",
                    9.0,
                    10.0,
                    "Your essay flows logically from introduction to conclusion. Great use of transitions!",
                ),
            ],
        ),
        graded(
            "Jane Smith",
            "Good effort! Your writing shows promise, but there are areas that need improvement, particularly in thesis clarity and evidence support.",
            vec![
                criterion(
                    "Thesis Statement",
                    5.0,
                    8.0,
                    "Your thesis is a bit vague. Try to be more specific about your main argument.",
                ),
                criterion(
                    "Evidence and Support",
                    10.0,
                    20.0,
                    "You need more specific examples to support your points. Consider adding more quotations from the text.",
                ),
                criterion(
                    "Organization",
                    8.0,
                    10.0,
                    "Good structure overall, but your body paragraphs could use clearer topic sentences.",
                ),
            ],
        ),
        graded(
            "Alex Johnson",
            "Excellent work! This is one of the best essays in the class. Your analysis is thorough and well-presented.",
            vec![
                criterion(
                    "Thesis Statement",
                    8.0,
                    8.0,
                    "Your thesis is compelling and precisely worded. Excellent job!",
                ),
                criterion(
                    "Evidence and Support",
                    19.0,
                    20.0,
                    "Outstanding use of evidence. Every claim is well-supported with specific examples.",
                ),
                criterion(
                    "Organization",
                    10.0,
                    10.0,
                    "Perfect organization. Your arguments build logically and your conclusion is strong.",
                ),
            ],
        ),
    ];
    let total = results.len() as u64;
    BatchGradingResponse { results, total }
}
