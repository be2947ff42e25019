// src/contract/mod.rs
//! Wire contract of the essay grading API.
//!
//! Every payload the grading server sends back has a typed counterpart here
//! and a [`Shape`] that [`validate`] checks a raw JSON value against.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod audit;
mod schema;
mod validate;

pub use schema::schema_for;
pub use validate::{ValidationError, Violation, validate};

/// Service name the grading server reports at its root endpoint.
pub const SERVICE_NAME: &str = "Essay Auto-Grading API";

/// `GET /` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    #[serde(rename = "ok")]
    Ok,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub gemini_configured: bool,
    pub model: String,
}

/// One rubric line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaFeedback {
    pub criteria_title: String,
    pub score: f64,
    pub score_max: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDetection {
    pub is_ai_generated: bool,
    /// Always within `[0, 1]`.
    pub confidence: f64,
}

/// A successfully graded submission. `criteria_feedback` keeps rubric order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    pub name: String,
    pub overall_feedback: String,
    pub criteria_feedback: Vec<CriteriaFeedback>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_detection: Option<AiDetection>,
}

/// A grading failure reported by the server in place of a result.
///
/// Single-grade failures look like `{error, detail?}`; batch entries carry
/// the submission `name` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Either a graded submission or the server's reason for not grading it.
///
/// On the wire the presence of `error` is the discriminator, so both
/// variants serialize without an extra tag. Deserializing goes through the
/// contract, so a payload carrying both shapes is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GradeOutcome {
    Success(GradingResult),
    Error(GradeFailure),
}

impl<'de> Deserialize<'de> for GradeOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        GradeOutcome::parse(&value).map_err(serde::de::Error::custom)
    }
}

impl GradeOutcome {
    pub fn name(&self) -> Option<&str> {
        match self {
            GradeOutcome::Success(result) => Some(&result.name),
            GradeOutcome::Error(failure) => failure.name.as_deref(),
        }
    }

    pub fn as_success(&self) -> Option<&GradingResult> {
        match self {
            GradeOutcome::Success(result) => Some(result),
            GradeOutcome::Error(_) => None,
        }
    }
}

/// `POST /api/grade/batch` response. `results[i]` belongs to the i-th upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchGradingResponse {
    pub results: Vec<GradeOutcome>,
    #[serde(deserialize_with = "whole_number")]
    pub total: u64,
}

/// JSON Schema counts `2.0` as an integer; serde does not.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u64::MAX as f64)
                .map(|n| n as u64)
        })
        .ok_or_else(|| serde::de::Error::custom(format!("{number} is not a non-negative integer")))
}

/// The payload shapes the contract knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    ServiceInfo,
    Health,
    CriteriaFeedback,
    GradeSuccess,
    GradeError,
    /// `GradeSuccess | GradeError`, as returned by `POST /api/grade`.
    GradeOutcome,
    /// `GradeSuccess | {name, error}`, one entry of a batch response.
    BatchItem,
    BatchResponse,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Shape::ServiceInfo => "ServiceInfo",
            Shape::Health => "HealthStatus",
            Shape::CriteriaFeedback => "CriteriaFeedback",
            Shape::GradeSuccess => "GradeSuccess",
            Shape::GradeError => "GradeError",
            Shape::GradeOutcome => "GradeOutcome",
            Shape::BatchItem => "BatchItem",
            Shape::BatchResponse => "BatchGradingResponse",
        };
        f.write_str(name)
    }
}

/// A value that passed validation, typed by the shape it was checked against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Validated {
    ServiceInfo(ServiceInfo),
    Health(HealthStatus),
    CriteriaFeedback(CriteriaFeedback),
    Grade(GradeOutcome),
    Batch(BatchGradingResponse),
}

/// Typed access to [`validate`] for a single shape.
pub trait Contract: Sized {
    const SHAPE: Shape;

    fn from_validated(value: Validated) -> Option<Self>;

    fn parse(value: &Value) -> Result<Self, ValidationError> {
        let validated = validate(Self::SHAPE, value)?;
        Self::from_validated(validated).ok_or_else(|| ValidationError::Mismatch {
            shape: Self::SHAPE,
            violations: vec![Violation::new("$", "validated into an unexpected type")],
        })
    }
}

impl Contract for ServiceInfo {
    const SHAPE: Shape = Shape::ServiceInfo;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::ServiceInfo(info) => Some(info),
            _ => None,
        }
    }
}

impl Contract for HealthStatus {
    const SHAPE: Shape = Shape::Health;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::Health(health) => Some(health),
            _ => None,
        }
    }
}

impl Contract for CriteriaFeedback {
    const SHAPE: Shape = Shape::CriteriaFeedback;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::CriteriaFeedback(item) => Some(item),
            _ => None,
        }
    }
}

impl Contract for GradingResult {
    const SHAPE: Shape = Shape::GradeSuccess;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::Grade(GradeOutcome::Success(result)) => Some(result),
            _ => None,
        }
    }
}

impl Contract for GradeFailure {
    const SHAPE: Shape = Shape::GradeError;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::Grade(GradeOutcome::Error(failure)) => Some(failure),
            _ => None,
        }
    }
}

impl Contract for GradeOutcome {
    const SHAPE: Shape = Shape::GradeOutcome;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::Grade(outcome) => Some(outcome),
            _ => None,
        }
    }
}

impl Contract for BatchGradingResponse {
    const SHAPE: Shape = Shape::BatchResponse;

    fn from_validated(value: Validated) -> Option<Self> {
        match value {
            Validated::Batch(batch) => Some(batch),
            _ => None,
        }
    }
}
