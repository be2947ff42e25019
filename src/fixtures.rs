// src/fixtures.rs
//! Fixture files uploaded by the conformance checks.

use std::path::{Path, PathBuf};

use reqwest::multipart::Part;

use crate::errors::{CheckError, Result};

/// Plain-text essay submission.
pub const SUBMISSION_TXT: &str = "message.txt";
/// PDF essay submission.
pub const SUBMISSION_PDF: &str = "draft-essay.pdf";
/// Rubric given to the grader as an image.
pub const RUBRIC_IMAGE: &str = "rubric.png";

/// A fixture file read into memory.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Fixture {
    /// Turns the fixture into a multipart file part.
    pub fn into_part(self) -> Result<Part> {
        let part = Part::bytes(self.bytes).file_name(self.file_name).mime_str(&self.mime)?;
        Ok(part)
    }
}

/// The directory fixtures are read from.
#[derive(Debug, Clone)]
pub struct FixtureSet {
    root: PathBuf,
}

impl FixtureSet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn load(&self, file_name: &str) -> Result<Fixture> {
        let path = self.root.join(file_name);
        let bytes = tokio::fs::read(&path).await.map_err(|source| CheckError::Fixture {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded fixture {} ({} bytes)", path.display(), bytes.len());
        let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        Ok(Fixture { file_name: file_name.to_string(), mime, bytes })
    }

    pub async fn part(&self, file_name: &str) -> Result<Part> {
        self.load(file_name).await?.into_part()
    }
}
