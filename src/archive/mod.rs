//! Durable archive of solution code
//!
//! The archive is the primary guarantee: code is uploaded before any
//! spreadsheet delivery is attempted, and a delivery failure never touches
//! what was archived. Paths are deterministic (see `layout`), so uploading
//! the same problem twice overwrites in place.

pub mod lang;
pub mod layout;
pub mod readme;

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Source-control upload boundary.
///
/// `upload` either returns a permanent URL to the stored content or fails;
/// existing content at the same path is overwritten.
#[async_trait]
pub trait ArchiveUploader: Send + Sync {
    async fn upload(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ExistingFile {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: Option<PutContent>,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    html_url: Option<String>,
}

/// GitHub contents API implementation of [`ArchiveUploader`].
pub struct GitHubUploader {
    client: Client,
    token: String,
    api_base: String,
}

impl GitHubUploader {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_api_base(token, "https://api.github.com")
    }

    pub fn with_api_base(token: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("solvetrack/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
            api_base: api_base.into(),
        })
    }

    fn contents_url(&self, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/contents/{}", self.api_base, repo, path)
    }

    /// SHA of the existing blob at `path`, if any. Needed for the contents
    /// API to accept an overwrite.
    async fn existing_sha(&self, repo: &str, path: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.contents_url(repo, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::Archive(format!(
                "lookup of {path} failed with HTTP {}",
                response.status()
            )));
        }
        let existing: ExistingFile = response.json().await?;
        Ok(Some(existing.sha))
    }
}

#[async_trait]
impl ArchiveUploader for GitHubUploader {
    async fn upload(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        commit_message: &str,
    ) -> Result<String> {
        let sha = self.existing_sha(repo, path).await?;
        let mut body = json!({
            "message": commit_message,
            "content": BASE64.encode(content),
        });
        if let Some(sha) = &sha {
            body["sha"] = json!(sha);
        }
        debug!(repo, path, overwrite = sha.is_some(), "uploading to archive");

        let response = self
            .client
            .put(self.contents_url(repo, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let preview: String = detail.chars().take(200).collect();
            return Err(Error::Archive(format!(
                "upload of {path} failed with HTTP {status}: {preview}"
            )));
        }
        let parsed: PutResponse = response.json().await?;
        parsed
            .content
            .and_then(|c| c.html_url)
            .ok_or_else(|| Error::Archive(format!("upload of {path} returned no content URL")))
    }
}
