// src/harness/checks.rs
//! The conformance suite for the essay grading API.

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::multipart::Form;

use super::{Check, HarnessContext};
use crate::client::JsonBody;
use crate::contract::{
    BatchGradingResponse, Contract, GradeFailure, GradeOutcome, GradingResult, HealthStatus, SERVICE_NAME,
    ServiceInfo, audit,
};
use crate::errors::{CheckError, Result};
use crate::fixtures::{RUBRIC_IMAGE, SUBMISSION_PDF, SUBMISSION_TXT};

/// Feedback style sent by the optional-field check.
pub const FEEDBACK_APPROACH: &str = "Be very detailed and constructive";

/// Every check, in the order it runs.
pub fn suite() -> Vec<Check> {
    vec![
        Check { endpoint: "GET /", name: "returns service name", run: service_name },
        Check { endpoint: "GET /api/health", name: "returns health status", run: health_status },
        Check {
            endpoint: "POST /api/grade",
            name: "grades a txt assignment with rubric",
            run: grade_txt,
        },
        Check {
            endpoint: "POST /api/grade",
            name: "grades a pdf assignment with rubric",
            run: grade_pdf,
        },
        Check {
            endpoint: "POST /api/grade",
            name: "accepts optional feedback_approach",
            run: grade_with_feedback_approach,
        },
        Check {
            endpoint: "POST /api/grade/batch",
            name: "grades multiple assignments in batch",
            run: grade_batch,
        },
    ]
}

fn service_name(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let body = ctx.client.get_json("/").await?;
        let info: ServiceInfo = expect_shape(&body)?;
        if info.service != SERVICE_NAME {
            return Err(CheckError::semantic("service", SERVICE_NAME, info.service));
        }
        Ok(())
    }
    .boxed()
}

fn health_status(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let body = ctx.client.get_json("/api/health").await?;
        let health: HealthStatus = expect_shape(&body)?;
        log::info!(
            "Server model: {} (gemini configured: {})",
            health.model,
            health.gemini_configured
        );
        Ok(())
    }
    .boxed()
}

fn grade_txt(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let form = grade_form(ctx, SUBMISSION_TXT).await?;
        let body = ctx.client.post_form("/api/grade", form).await?;
        expect_graded(ctx, &body)?;
        Ok(())
    }
    .boxed()
}

fn grade_pdf(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let form = grade_form(ctx, SUBMISSION_PDF).await?;
        let body = ctx.client.post_form("/api/grade", form).await?;
        expect_graded(ctx, &body)?;
        Ok(())
    }
    .boxed()
}

fn grade_with_feedback_approach(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let form = grade_form(ctx, SUBMISSION_TXT)
            .await?
            .text("feedback_approach", FEEDBACK_APPROACH);
        let body = ctx.client.post_form("/api/grade", form).await?;
        expect_graded(ctx, &body)?;
        Ok(())
    }
    .boxed()
}

fn grade_batch(ctx: &HarnessContext) -> BoxFuture<'_, Result<()>> {
    async move {
        let uploads = [SUBMISSION_TXT, SUBMISSION_PDF];
        let mut form = Form::new();
        for name in uploads {
            form = form.part("assignments", ctx.fixtures.part(name).await?);
        }
        let form = form.part("rubric", ctx.fixtures.part(RUBRIC_IMAGE).await?);

        let body = ctx.client.post_form("/api/grade/batch", form).await?;
        let batch = expect_batch(&body)?;

        if batch.total != uploads.len() as u64 {
            return Err(CheckError::semantic("total", uploads.len(), batch.total));
        }
        if batch.results.len() != uploads.len() {
            return Err(CheckError::semantic("results length", uploads.len(), batch.results.len()));
        }
        for (idx, (upload, outcome)) in uploads.iter().zip(&batch.results).enumerate() {
            match outcome {
                GradeOutcome::Success(result) => {
                    require_criteria(&format!("$.results[{idx}]"), result)?;
                }
                GradeOutcome::Error(failure) => {
                    log::warn!("Batch entry for {} came back as an error: {}", upload, failure.message);
                }
            }
        }
        report_findings(ctx, audit::batch(&batch))
    }
    .boxed()
}

async fn grade_form(ctx: &HarnessContext, submission: &str) -> Result<Form> {
    let form = Form::new()
        .part("assignments", ctx.fixtures.part(submission).await?)
        .part("rubric", ctx.fixtures.part(RUBRIC_IMAGE).await?);
    Ok(form)
}

fn expect_shape<T: Contract>(body: &JsonBody) -> Result<T> {
    T::parse(&body.value).map_err(|source| CheckError::Shape { body: body.excerpt(), source })
}

/// Accepts only a graded result; a server error payload is surfaced with its own message.
fn expect_graded(ctx: &HarnessContext, body: &JsonBody) -> Result<GradingResult> {
    match expect_shape::<GradeOutcome>(body)? {
        GradeOutcome::Success(result) => {
            require_criteria("$", &result)?;
            report_findings(ctx, audit::grading_result(&result))?;
            Ok(result)
        }
        GradeOutcome::Error(failure) => Err(api_error(failure)),
    }
}

fn expect_batch(body: &JsonBody) -> Result<BatchGradingResponse> {
    match expect_shape::<BatchGradingResponse>(body) {
        Ok(batch) => Ok(batch),
        Err(shape_err) => match GradeFailure::parse(&body.value) {
            Ok(failure) => Err(api_error(failure)),
            Err(_) => Err(shape_err),
        },
    }
}

fn api_error(failure: GradeFailure) -> CheckError {
    CheckError::Api { message: failure.message, detail: failure.detail }
}

/// A successful grade must cover at least one rubric criterion.
fn require_criteria(path: &str, result: &GradingResult) -> Result<()> {
    if result.criteria_feedback.is_empty() {
        return Err(CheckError::semantic(format!("{path}.criteria_feedback length"), ">= 1", 0));
    }
    Ok(())
}

fn report_findings(ctx: &HarnessContext, findings: Vec<audit::Finding>) -> Result<()> {
    for finding in &findings {
        log::warn!("Contract audit: {}", finding);
    }
    if ctx.strict && !findings.is_empty() {
        let joined = findings.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
        return Err(CheckError::Audit(joined));
    }
    Ok(())
}
