// src/harness/mod.rs
//! Sequential conformance runner.
//!
//! Checks run one at a time in declaration order. A failing or hung check is
//! recorded and the run moves on; nothing short of a bad configuration stops
//! the suite early.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde::Serialize;

use crate::client::GradingClient;
use crate::config::HarnessConfig;
use crate::errors::{CheckError, DIAGNOSTIC_LIMIT, ErrorKind, Result, truncate};
use crate::fixtures::FixtureSet;

pub mod checks;

/// The async body of a check.
pub type CheckFn = fn(&HarnessContext) -> BoxFuture<'_, Result<()>>;

/// One named conformance check against one endpoint.
#[derive(Clone, Copy)]
pub struct Check {
    /// Endpoint label used to group output, e.g. `POST /api/grade`.
    pub endpoint: &'static str,
    pub name: &'static str,
    pub run: CheckFn,
}

/// Everything a check needs to talk to the server.
pub struct HarnessContext {
    pub client: GradingClient,
    pub fixtures: FixtureSet,
    pub strict: bool,
}

impl HarnessContext {
    pub fn new(config: &HarnessConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &HarnessConfig) -> Self {
        Self {
            client: GradingClient::new(client, config.base_url.clone()),
            fixtures: FixtureSet::new(config.assets_dir.clone()),
            strict: config.strict,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub endpoint: String,
    pub name: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

/// Pass/fail tally for one run, threaded through the runner by value.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub base_url: String,
    pub started_at: String,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<CheckOutcome>,
}

impl RunReport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            started_at: chrono::Utc::now().to_rfc3339(),
            passed: 0,
            failed: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(mut self, outcome: CheckOutcome) -> Self {
        if outcome.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
        self
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn summary(&self) -> String {
        format!("{} passed, {} failed, {} total", self.passed, self.failed, self.total())
    }

    /// Process exit status: `0` when every check passed.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Runs a single check, turning any error or timeout into a failed outcome.
pub async fn run_check(ctx: &HarnessContext, check: &Check, limit: Duration) -> CheckOutcome {
    let start = Instant::now();
    let result = match tokio::time::timeout(limit, (check.run)(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(CheckError::Timeout(limit.as_millis() as u64)),
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let (kind, message) = match result {
        Ok(()) => (None, None),
        Err(e) => {
            log::error!("Check '{}' failed: {}", check.name, e);
            (Some(e.kind()), Some(truncate(&e.to_string(), DIAGNOSTIC_LIMIT)))
        }
    };

    CheckOutcome {
        endpoint: check.endpoint.to_string(),
        name: check.name.to_string(),
        passed: kind.is_none(),
        kind,
        message,
        elapsed_ms,
    }
}

/// Runs `checks` in order and prints each outcome as soon as it is known.
pub async fn run(ctx: &HarnessContext, checks: &[Check], limit: Duration) -> RunReport {
    println!("\n=== Grading API Conformance ===\n");
    log::info!("Running {} checks against {}", checks.len(), ctx.client.base_url());

    let mut report = RunReport::new(ctx.client.base_url());
    let mut current_endpoint = None;

    for check in checks {
        if current_endpoint != Some(check.endpoint) {
            if current_endpoint.is_some() {
                println!();
            }
            println!("{}", check.endpoint);
            current_endpoint = Some(check.endpoint);
        }

        let outcome = run_check(ctx, check, limit).await;
        match &outcome.message {
            None => println!("  ✓ {}", outcome.name),
            Some(message) => {
                println!("  ✗ {}", outcome.name);
                println!("    {}", message);
            }
        }
        report = report.record(outcome);
    }

    println!("\n---");
    println!("Results: {}\n", report.summary());
    report
}
