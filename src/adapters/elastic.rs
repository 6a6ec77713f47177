//! Elasticsearch `_bulk` indexing, plus a file sink for dry runs.

use crate::config::settings::ElasticSettings;
use crate::domain::ports::{BulkOutcome, BulkSink};
use crate::parsers::alarm::AlarmEvent;
use crate::utils::error::{ReconcileError, Result};
use async_trait::async_trait;
use reqwest::{Certificate, Client};
use serde::Deserialize;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BULK_TIMEOUT: Duration = Duration::from_secs(300);

/// Builds a `_bulk` body: a `create` action line before every event.
pub fn bulk_body(index: &str, events: &[AlarmEvent]) -> Result<String> {
    let action = serde_json::to_string(&json!({ "create": { "_index": index } }))?;
    let mut body = String::new();
    for event in events {
        body.push_str(&action);
        body.push('\n');
        body.push_str(&serde_json::to_string(event)?);
        body.push('\n');
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

pub struct ElasticClient {
    bulk_url: String,
    username: Option<String>,
    password: Option<String>,
    client: Client,
}

impl ElasticClient {
    pub fn new(settings: &ElasticSettings) -> Result<Self> {
        let mut builder = Client::builder().timeout(BULK_TIMEOUT);
        if let Some(ca_cert) = &settings.ca_cert {
            let pem = std::fs::read(ca_cert)?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
        }

        Ok(Self {
            bulk_url: format!("{}/_bulk", settings.url.trim_end_matches('/')),
            username: settings.username.clone(),
            password: settings.password.clone(),
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl BulkSink for ElasticClient {
    async fn send(&self, body: String) -> Result<BulkOutcome> {
        tracing::debug!("POST {} ({} bytes)", self.bulk_url, body.len());
        let mut request = self
            .client
            .post(&self.bulk_url)
            .header("Content-Type", "application/x-ndjson")
            .body(body);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReconcileError::ApiError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let parsed: BulkResponse = response.json().await?;
        Ok(BulkOutcome {
            items: parsed.items.len(),
            errors: parsed.errors,
        })
    }
}

/// Appends bulk bodies to a file instead of posting them.
pub struct NdjsonFile {
    path: PathBuf,
}

impl NdjsonFile {
    /// Creates the file, truncating an earlier run's output.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::File::create(&path)?;
        Ok(Self { path })
    }
}

#[async_trait]
impl BulkSink for NdjsonFile {
    async fn send(&self, body: String) -> Result<BulkOutcome> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(body.as_bytes())?;
        Ok(BulkOutcome {
            items: body.lines().count() / 2,
            errors: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::Value;

    fn event(tag: &str) -> AlarmEvent {
        let mut event = AlarmEvent::new();
        event.insert("Tag".to_string(), Value::from(tag));
        event
    }

    #[test]
    fn test_bulk_body_layout() {
        let body = bulk_body("sas-event-01", &[event("A"), event("B")]).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"create":{"_index":"sas-event-01"}}"#);
        assert_eq!(lines[1], r#"{"Tag":"A"}"#);
        assert!(body.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_bulk_reports_errors_flag() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/_bulk")
                .header("Content-Type", "application/x-ndjson")
                .header_exists("Authorization");
            then.status(200)
                .json_body(serde_json::json!({"took": 3, "errors": true, "items": [{}, {}]}));
        });

        let client = ElasticClient::new(&ElasticSettings {
            url: server.base_url(),
            index: "sas-event-01".to_string(),
            username: Some("elastic".to_string()),
            password: Some("pw".to_string()),
            ca_cert: None,
            batch_size: 10,
        })
        .unwrap();
        let outcome = client
            .send(bulk_body("sas-event-01", &[event("A")]).unwrap())
            .await
            .unwrap();

        mock.assert();
        assert!(outcome.errors);
        assert_eq!(outcome.items, 2);
    }

    #[test]
    fn test_ndjson_file_sink() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let sink = NdjsonFile::create(&path).unwrap();

        let outcome = tokio_test::block_on(
            sink.send(bulk_body("idx", &[event("A"), event("B")]).unwrap()),
        )
        .unwrap();
        tokio_test::block_on(sink.send(bulk_body("idx", &[event("C")]).unwrap())).unwrap();

        assert_eq!(outcome.items, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 6);
    }
}
