//! URL sources

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{RconfigError, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

static CLIENT: Lazy<std::result::Result<Client, String>> = Lazy::new(|| {
    Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("rconfig/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| e.to_string())
});

pub fn is_url(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// GET `url`. A 404 is reported as absent; any other failure is an error.
pub fn fetch_url(url: &str) -> Result<Option<String>> {
    let client = CLIENT.as_ref().map_err(|e| RconfigError::load(url, e))?;
    let response = client.get(url).send().map_err(|e| RconfigError::load(url, e))?;
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let response = response.error_for_status().map_err(|e| RconfigError::load(url, e))?;
    let body = response.text().map_err(|e| RconfigError::load(url, e))?;
    tracing::debug!(url, bytes = body.len(), "fetched remote source");
    Ok(Some(body))
}
