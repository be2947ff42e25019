// src/client.rs

use reqwest::Client;
use reqwest::multipart::Form;
use serde_json::Value;
use std::time::Instant;

use crate::errors::{CheckError, DIAGNOSTIC_LIMIT, Result, truncate};

/// A JSON body as received, kept alongside its raw text for diagnostics.
#[derive(Debug, Clone)]
pub struct JsonBody {
    pub value: Value,
    pub raw: String,
}

impl JsonBody {
    /// The raw body cut down for error messages.
    pub fn excerpt(&self) -> String {
        truncate(&self.raw, DIAGNOSTIC_LIMIT)
    }
}

/// Talks to a running grading server.
#[derive(Debug, Clone)]
pub struct GradingClient {
    client: Client,
    base_url: String,
}

impl GradingClient {
    /// Creates a new `GradingClient`.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json(&self, path: &str) -> Result<JsonBody> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let start = Instant::now();
        let resp = self.client.get(&url).send().await?;
        read_json(resp, start).await
    }

    pub async fn post_form(&self, path: &str, form: Form) -> Result<JsonBody> {
        let url = self.url(path);
        log::debug!("POST {} (multipart)", url);
        let start = Instant::now();
        let resp = self.client.post(&url).multipart(form).send().await?;
        read_json(resp, start).await
    }
}

async fn read_json(resp: reqwest::Response, start: Instant) -> Result<JsonBody> {
    let status = resp.status();
    let raw = resp.text().await?;
    log::debug!("Response status: {} ({}ms)", status, start.elapsed().as_millis());

    if !status.is_success() {
        return Err(CheckError::Status {
            status: status.as_u16(),
            body: truncate(&raw, DIAGNOSTIC_LIMIT),
        });
    }

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(JsonBody { value, raw }),
        Err(source) => Err(CheckError::NotJson { body: truncate(&raw, DIAGNOSTIC_LIMIT), source }),
    }
}
