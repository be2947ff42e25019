// src/contract/validate.rs
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::schema::{self, schema_for};
use super::{GradeFailure, GradeOutcome, GradingResult, Shape, Validated};

const ROOT: &str = "$";

/// One field that broke its declared constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{shape} mismatch: {}", join(.violations, "; "))]
    Mismatch { shape: Shape, violations: Vec<Violation> },

    #[error("{shape} matched no variant: {}", join(.attempts, " | "))]
    NoVariant { shape: Shape, attempts: Vec<ValidationError> },

    #[error("{shape} schema failed to compile: {message}")]
    Schema { shape: Shape, message: String },
}

impl ValidationError {
    pub fn shape(&self) -> Shape {
        match self {
            ValidationError::Mismatch { shape, .. }
            | ValidationError::NoVariant { shape, .. }
            | ValidationError::Schema { shape, .. } => *shape,
        }
    }

    /// Every violation, including those of each failed union attempt.
    pub fn violations(&self) -> Vec<&Violation> {
        match self {
            ValidationError::Mismatch { violations, .. } => violations.iter().collect(),
            ValidationError::NoVariant { attempts, .. } => {
                attempts.iter().flat_map(|attempt| attempt.violations()).collect()
            }
            ValidationError::Schema { .. } => Vec::new(),
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.violations().into_iter().map(|v| v.path.as_str()).collect()
    }
}

fn join<T: std::fmt::Display>(items: &[T], sep: &str) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(sep)
}

/// Checks `candidate` against `shape`, returning the typed value or every
/// violation found, ordered by path.
///
/// Optional fields may be absent, but when present they must be valid.
/// Unions try the success shape first, then the error shape.
pub fn validate(shape: Shape, candidate: &Value) -> Result<Validated, ValidationError> {
    match shape {
        Shape::GradeOutcome => grade_union(shape, candidate, false).map(Validated::Grade),
        Shape::BatchItem => grade_union(shape, candidate, true).map(Validated::Grade),
        Shape::ServiceInfo => typed(shape, &schema_for(shape), candidate).map(Validated::ServiceInfo),
        Shape::Health => typed(shape, &schema_for(shape), candidate).map(Validated::Health),
        Shape::CriteriaFeedback => {
            typed(shape, &schema_for(shape), candidate).map(Validated::CriteriaFeedback)
        }
        Shape::GradeSuccess => typed(shape, &schema::grade_success(), candidate)
            .map(|result| Validated::Grade(GradeOutcome::Success(result))),
        Shape::GradeError => typed(shape, &schema::grade_error(false), candidate)
            .map(|failure| Validated::Grade(GradeOutcome::Error(failure))),
        Shape::BatchResponse => typed(shape, &schema_for(shape), candidate).map(Validated::Batch),
    }
}

fn grade_union(
    shape: Shape,
    candidate: &Value,
    name_required: bool,
) -> Result<GradeOutcome, ValidationError> {
    let success_err =
        match typed::<GradingResult>(Shape::GradeSuccess, &schema::grade_success(), candidate) {
            Ok(result) => return Ok(GradeOutcome::Success(result)),
            Err(err) => err,
        };
    let error_schema = schema::grade_error(name_required);
    match typed::<GradeFailure>(Shape::GradeError, &error_schema, candidate) {
        Ok(failure) => Ok(GradeOutcome::Error(failure)),
        Err(error_err) => Err(ValidationError::NoVariant {
            shape,
            attempts: vec![success_err, error_err],
        }),
    }
}

/// Schema check first, then serde for the typed value.
fn typed<T: DeserializeOwned>(
    shape: Shape,
    schema: &Value,
    candidate: &Value,
) -> Result<T, ValidationError> {
    check(shape, schema, candidate)?;
    serde_json::from_value(candidate.clone()).map_err(|err| ValidationError::Mismatch {
        shape,
        violations: vec![Violation::new(ROOT, err.to_string())],
    })
}

fn check(shape: Shape, schema: &Value, candidate: &Value) -> Result<(), ValidationError> {
    let validator = compile(shape, schema)?;
    let mut violations: Vec<Violation> =
        validator.iter_errors(candidate).map(|err| violation(&err)).collect();
    if violations.is_empty() {
        return Ok(());
    }
    violations.sort_by(|a, b| a.path.cmp(&b.path));
    violations.dedup();
    Err(ValidationError::Mismatch { shape, violations })
}

fn compile(shape: Shape, schema: &Value) -> Result<Validator, ValidationError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| ValidationError::Schema { shape, message: err.to_string() })
}

fn violation(err: &jsonschema::ValidationError<'_>) -> Violation {
    let mut path = pointer_to_path(err.instance_path.as_str());
    // A missing field is reported on its parent object; point at the field itself.
    if let ValidationErrorKind::Required { property } = &err.kind {
        if let Some(name) = property.as_str() {
            path = format!("{path}.{name}");
        }
    }
    Violation::new(path, err.to_string())
}

/// `/criteria_feedback/0/score` becomes `$.criteria_feedback[0].score`.
///
/// All-digit segments are read as array indexes; no payload here has numeric keys.
fn pointer_to_path(pointer: &str) -> String {
    let mut path = String::from(ROOT);
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(&segment);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_to_path() {
        assert_eq!(pointer_to_path(""), "$");
        assert_eq!(pointer_to_path("/criteria_feedback/0/score"), "$.criteria_feedback[0].score");
        assert_eq!(pointer_to_path("/a~1b/c~0d"), "$.a/b.c~d");
    }

    #[test]
    fn test_every_shape_schema_compiles() {
        for shape in [
            Shape::ServiceInfo,
            Shape::Health,
            Shape::CriteriaFeedback,
            Shape::GradeSuccess,
            Shape::GradeError,
            Shape::GradeOutcome,
            Shape::BatchItem,
            Shape::BatchResponse,
        ] {
            assert!(compile(shape, &schema_for(shape)).is_ok(), "{shape} schema");
        }
    }

    #[test]
    fn test_reports_every_violating_path() {
        let body = json!({
            "name": 7,
            "criteria_feedback": [
                {"criteria_title": "Thesis", "score": "high", "score_max": 8, "feedback": "ok"},
                {"criteria_title": "", "score": 1, "feedback": "ok"}
            ]
        });

        let err = validate(Shape::GradeSuccess, &body).unwrap_err();
        let paths = err.paths();
        assert_eq!(err.shape(), Shape::GradeSuccess);
        assert!(paths.contains(&"$.name"));
        assert!(paths.contains(&"$.overall_feedback"));
        assert!(paths.contains(&"$.criteria_feedback[0].score"));
        assert!(paths.contains(&"$.criteria_feedback[1].criteria_title"));
        assert!(paths.contains(&"$.criteria_feedback[1].score_max"));
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn test_criteria_title_only_needs_to_be_non_empty() {
        let line = |title: &str| {
            json!({"criteria_title": title, "score": 1, "score_max": 2, "feedback": ""})
        };
        assert!(validate(Shape::CriteriaFeedback, &line("  ")).is_ok());
        let err = validate(Shape::CriteriaFeedback, &line("")).unwrap_err();
        assert_eq!(err.paths(), vec!["$.criteria_title"]);
    }

    #[test]
    fn test_health_literal_status() {
        let good = json!({"status": "ok", "gemini_configured": true, "model": "gemini-2.0-flash"});
        assert!(matches!(validate(Shape::Health, &good), Ok(Validated::Health(_))));

        let bad = json!({"status": "healthy", "gemini_configured": "yes", "model": "m"});
        let err = validate(Shape::Health, &bad).unwrap_err();
        assert_eq!(err.paths(), vec!["$.gemini_configured", "$.status"]);
    }

    #[test]
    fn test_optional_fields_absent_or_valid() {
        let mut body = json!({
            "name": "essay.txt",
            "overall_feedback": "Solid work",
            "criteria_feedback": [
                {"criteria_title": "Thesis", "score": 2, "score_max": 2, "feedback": "Clear"}
            ]
        });
        assert!(validate(Shape::GradeSuccess, &body).is_ok());

        body["images"] = json!(["page-1.png"]);
        body["ai_detection"] = json!({"is_ai_generated": false, "confidence": 0.2});
        assert!(validate(Shape::GradeSuccess, &body).is_ok());

        body["images"] = json!([1]);
        body["ai_detection"] = json!({"is_ai_generated": false, "confidence": 1.5});
        let err = validate(Shape::GradeSuccess, &body).unwrap_err();
        assert_eq!(err.paths(), vec!["$.ai_detection.confidence", "$.images[0]"]);
    }

    #[test]
    fn test_null_optional_is_malformed() {
        let body = json!({"error": "Grading failed", "detail": null});
        let err = validate(Shape::GradeError, &body).unwrap_err();
        assert_eq!(err.paths(), vec!["$.detail"]);
    }

    #[test]
    fn test_union_names_both_attempts() {
        let body = json!({"name": "a.txt"});
        let err = validate(Shape::GradeOutcome, &body).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GradeSuccess"));
        assert!(message.contains("GradeError"));
        assert!(matches!(err, ValidationError::NoVariant { ref attempts, .. } if attempts.len() == 2));
    }

    #[test]
    fn test_union_accepts_exactly_one_variant() {
        let error = json!({"error": "Grading failed", "detail": "quota"});
        assert!(validate(Shape::GradeError, &error).is_ok());
        assert!(validate(Shape::GradeSuccess, &error).is_err());

        let mixed = json!({
            "name": "x",
            "overall_feedback": "",
            "criteria_feedback": [],
            "error": "also failed"
        });
        let success_err = validate(Shape::GradeSuccess, &mixed).unwrap_err();
        assert_eq!(success_err.paths(), vec!["$.error"]);
        let error_err = validate(Shape::GradeError, &mixed).unwrap_err();
        assert_eq!(error_err.paths(), vec!["$.criteria_feedback"]);
    }

    #[test]
    fn test_batch_item_error_requires_name() {
        let nameless = json!({"error": "unsupported file"});
        assert!(validate(Shape::GradeOutcome, &nameless).is_ok());
        assert!(validate(Shape::BatchItem, &nameless).is_err());
    }

    #[test]
    fn test_batch_reports_bad_item_and_total() {
        let body = json!({
            "results": [
                {"name": "a.txt", "error": "unreadable"},
                {"name": "b.txt"}
            ],
            "total": -2
        });
        let err = validate(Shape::BatchResponse, &body).unwrap_err();
        assert_eq!(err.paths(), vec!["$.results[1]", "$.total"]);
    }

    #[test]
    fn test_fractional_total_is_rejected() {
        let body = json!({"results": [], "total": 1.5});
        let err = validate(Shape::BatchResponse, &body).unwrap_err();
        assert_eq!(err.paths(), vec!["$.total"]);
    }

    #[test]
    fn test_non_object_root() {
        let err = validate(Shape::ServiceInfo, &json!([1, 2])).unwrap_err();
        assert_eq!(err.paths(), vec!["$"]);
    }
}
