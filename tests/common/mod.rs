// tests/common/mod.rs
//! An in-process stand-in for the grading server.

use std::time::Duration;

use actix_multipart::Multipart;
use actix_web::{App, HttpResponse, HttpServer, web};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;

use gradecheck::config::HarnessConfig;
use gradecheck::contract::{
    BatchGradingResponse, CriteriaFeedback, GradeFailure, GradeOutcome, GradingResult,
};
use gradecheck::mock;

/// How the mock server misbehaves, if at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Behavior {
    Healthy,
    GradeError,
    WrongBatchCount,
    ScoreOverflow,
    SlowGrade(Duration),
    /// The batch endpoint answers with a bare error payload.
    BatchError,
    /// Successful grades carry no criteria.
    EmptyCriteria,
    /// The single-grade endpoint fails with a 500.
    ServerError,
    /// The single-grade endpoint answers 200 with an HTML page.
    NotJson,
}

pub struct Upload {
    pub field: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

async fn read_uploads(mut payload: Multipart) -> Vec<Upload> {
    let mut uploads = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);
        let mut bytes = Vec::new();
        while let Some(Ok(chunk)) = field.next().await {
            bytes.extend_from_slice(&chunk);
        }
        uploads.push(Upload { field: name, file_name, bytes });
    }
    uploads
}

fn graded(name: &str, overall: String, score: f64) -> GradingResult {
    GradingResult {
        name: name.to_string(),
        overall_feedback: overall,
        criteria_feedback: vec![CriteriaFeedback {
            criteria_title: "thesis".to_string(),
            score,
            score_max: 10.0,
            feedback: "Clear, specific main claim.".to_string(),
        }],
        images: None,
        ai_detection: None,
    }
}

async fn root() -> HttpResponse {
    HttpResponse::Ok().json(mock::service_info())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(mock::health_status(false))
}

async fn grade(behavior: web::Data<Behavior>, payload: Multipart) -> HttpResponse {
    let uploads = read_uploads(payload).await;
    let assignments: Vec<&Upload> = uploads.iter().filter(|u| u.field == "assignments").collect();
    let has_rubric = uploads.iter().any(|u| u.field == "rubric" && !u.bytes.is_empty());
    if assignments.len() != 1 || !has_rubric {
        return HttpResponse::BadRequest().json(json!({"error": "expected one assignment and a rubric"}));
    }
    let approach = uploads
        .iter()
        .find(|u| u.field == "feedback_approach")
        .map(|u| String::from_utf8_lossy(&u.bytes).to_string());

    let name = assignments[0].file_name.clone().unwrap_or_default();
    let overall = match approach {
        Some(approach) => format!("Graded with approach: {approach}"),
        None => "Solid structure, thin evidence.".to_string(),
    };

    match *behavior.get_ref() {
        Behavior::SlowGrade(delay) => {
            actix_web::rt::time::sleep(delay).await;
            HttpResponse::Ok().json(graded(&name, overall, 7.0))
        }
        Behavior::GradeError => HttpResponse::Ok().json(mock::grade_failure("model quota exceeded")),
        Behavior::ScoreOverflow => HttpResponse::Ok().json(graded(&name, overall, 12.0)),
        Behavior::EmptyCriteria => {
            let mut result = graded(&name, overall, 7.0);
            result.criteria_feedback.clear();
            HttpResponse::Ok().json(result)
        }
        Behavior::ServerError => HttpResponse::InternalServerError().body("internal error"),
        Behavior::NotJson => HttpResponse::Ok()
            .content_type("text/html")
            .body("<html><body>502 Bad Gateway</body></html>"),
        Behavior::Healthy | Behavior::WrongBatchCount | Behavior::BatchError => {
            HttpResponse::Ok().json(graded(&name, overall, 7.0))
        }
    }
}

async fn grade_batch(behavior: web::Data<Behavior>, payload: Multipart) -> HttpResponse {
    let uploads = read_uploads(payload).await;
    if *behavior.get_ref() == Behavior::BatchError {
        return HttpResponse::Ok().json(mock::grade_failure("model quota exceeded"));
    }
    let results: Vec<GradeOutcome> = uploads
        .iter()
        .filter(|u| u.field == "assignments")
        .map(|u| {
            let name = u.file_name.clone().unwrap_or_default();
            if u.bytes.is_empty() {
                GradeOutcome::Error(GradeFailure {
                    name: Some(name),
                    message: "empty file".to_string(),
                    detail: None,
                })
            } else {
                let mut result = graded(&name, "Batch graded.".to_string(), 6.0);
                if *behavior.get_ref() == Behavior::EmptyCriteria {
                    result.criteria_feedback.clear();
                }
                GradeOutcome::Success(result)
            }
        })
        .collect();
    let mut total = results.len() as u64;
    if *behavior.get_ref() == Behavior::WrongBatchCount {
        total += 1;
    }
    HttpResponse::Ok().json(BatchGradingResponse { results, total })
}

/// Starts a mock server on an ephemeral port and returns its base URL.
pub fn spawn_server(behavior: Behavior) -> std::io::Result<String> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(behavior))
            .route("/", web::get().to(root))
            .route("/api/health", web::get().to(health))
            .route("/api/grade", web::post().to(grade))
            .route("/api/grade/batch", web::post().to(grade_batch))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))?;
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    Ok(format!("http://{addr}"))
}

/// A base URL nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn config_for(base_url: &str, timeout_secs: u64, strict: bool) -> HarnessConfig {
    let timeout = timeout_secs.to_string();
    HarnessConfig::from_lookup(|key| match key {
        "API_URL" => Some(base_url.to_string()),
        "GRADECHECK_TIMEOUT_SECS" => Some(timeout.clone()),
        "GRADECHECK_STRICT" => Some(strict.to_string()),
        _ => None,
    })
    .unwrap()
}
