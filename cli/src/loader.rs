//! Per-invocation document loading: standard input, a local file,
//! or an HTTP(S) fetch.
//!
//! The loader is an explicit configuration object built for each
//! invocation; nothing here mutates process-wide state.

use std::io::Read;
use std::time::Duration;
use std::{fs, io};

use anyhow::{Context, Result};

/// Loads the input document as text.
pub struct Loader {
    http_timeout: Duration,
}

impl Loader {
    /// Build a loader whose HTTP requests time out after `http_timeout`.
    pub fn new(http_timeout: Duration) -> Self {
        Self { http_timeout }
    }

    /// Read the document designated by `input`:
    /// an `http(s)` IRI, a file path, or standard input when `None`.
    pub fn load(&self, input: Option<&str>) -> Result<String> {
        match input {
            None => {
                log::debug!("reading from standard input");
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read standard input")?;
                Ok(buf)
            }
            Some(iri) if iri.starts_with("http://") || iri.starts_with("https://") => {
                log::debug!("fetching {iri}");
                let client = reqwest::blocking::Client::builder()
                    .timeout(self.http_timeout)
                    .build()
                    .context("failed to build HTTP client")?;
                let response = client
                    .get(iri)
                    .header(reqwest::header::ACCEPT, "application/n-quads")
                    .send()
                    .and_then(reqwest::blocking::Response::error_for_status)
                    .with_context(|| format!("failed to fetch {iri}"))?;
                response
                    .text()
                    .with_context(|| format!("failed to read the body of {iri}"))
            }
            Some(path) => {
                log::debug!("reading {path}");
                fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
            }
        }
    }
}
