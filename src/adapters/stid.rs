//! STID tag reference lookups.

use crate::config::settings::StidSettings;
use crate::utils::error::{ReconcileError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub struct StidClient {
    base_url: String,
    token: String,
    client: Client,
}

impl StidClient {
    pub fn new(settings: &StidSettings) -> Result<Self> {
        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
        })
    }

    /// Tag references of `tag_no` on installation `inst_code`.
    pub async fn tag_refs(&self, inst_code: &str, tag_no: &str) -> Result<Vec<Value>> {
        let url = format!("{}/{}/tag/tag-refs", self.base_url, inst_code);
        tracing::debug!("GET {} tagNo={}", url, tag_no);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .query(&[("instCode", inst_code), ("tagNo", tag_no)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReconcileError::ApiError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

/// Entries whose `tagType` equals `tag_type`.
pub fn of_type<'a>(refs: &'a [Value], tag_type: &str) -> Vec<&'a Value> {
    refs.iter()
        .filter(|r| r.get("tagType").and_then(Value::as_str) == Some(tag_type))
        .collect()
}
