// src/contract/schema.rs
//! JSON Schema (draft 2020-12) for every payload shape.

use serde_json::{Value, json};

use super::Shape;

/// The schema a candidate value is checked against for `shape`.
///
/// Union shapes are `anyOf` their variants; the validator still tries the
/// variants one at a time so it can say why each one failed.
pub fn schema_for(shape: Shape) -> Value {
    match shape {
        Shape::ServiceInfo => service_info(),
        Shape::Health => health(),
        Shape::CriteriaFeedback => criteria_feedback(),
        Shape::GradeSuccess => grade_success(),
        Shape::GradeError => grade_error(false),
        Shape::GradeOutcome => json!({ "anyOf": [grade_success(), grade_error(false)] }),
        Shape::BatchItem => batch_item(),
        Shape::BatchResponse => batch_response(),
    }
}

fn service_info() -> Value {
    json!({
        "type": "object",
        "required": ["service"],
        "properties": {
            "service": { "type": "string" }
        }
    })
}

fn health() -> Value {
    json!({
        "type": "object",
        "required": ["status", "gemini_configured", "model"],
        "properties": {
            "status": { "const": "ok" },
            "gemini_configured": { "type": "boolean" },
            "model": { "type": "string" }
        }
    })
}

fn criteria_feedback() -> Value {
    json!({
        "type": "object",
        "required": ["criteria_title", "score", "score_max", "feedback"],
        "properties": {
            "criteria_title": { "type": "string", "minLength": 1 },
            "score": { "type": "number" },
            "score_max": { "type": "number" },
            "feedback": { "type": "string" }
        }
    })
}

/// A graded submission. Carrying `error` as well makes it an error payload.
pub(crate) fn grade_success() -> Value {
    json!({
        "type": "object",
        "required": ["name", "overall_feedback", "criteria_feedback"],
        "properties": {
            "name": { "type": "string" },
            "overall_feedback": { "type": "string" },
            "criteria_feedback": { "type": "array", "items": criteria_feedback() },
            "images": { "type": "array", "items": { "type": "string" } },
            "ai_detection": {
                "type": "object",
                "required": ["is_ai_generated", "confidence"],
                "properties": {
                    "is_ai_generated": { "type": "boolean" },
                    "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                }
            },
            "error": false
        }
    })
}

/// `{error, detail?}`; batch entries must also name the submission.
pub(crate) fn grade_error(name_required: bool) -> Value {
    let required = if name_required { json!(["name", "error"]) } else { json!(["error"]) };
    json!({
        "type": "object",
        "required": required,
        "properties": {
            "name": { "type": "string" },
            "error": { "type": "string" },
            "detail": { "type": "string" },
            "criteria_feedback": false
        }
    })
}

fn batch_item() -> Value {
    json!({ "anyOf": [grade_success(), grade_error(true)] })
}

fn batch_response() -> Value {
    json!({
        "type": "object",
        "required": ["results", "total"],
        "properties": {
            "results": { "type": "array", "items": batch_item() },
            "total": { "type": "integer", "minimum": 0 }
        }
    })
}
