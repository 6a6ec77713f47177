//! Resolved settings: command-line value, else config file, else default.

use super::file::FileConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    normalize_base_url, validate_non_empty_string, validate_positive_number,
    validate_required_field, Validate,
};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "ipam-reconcile.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ELASTIC_URL: &str = "https://localhost:9200";
pub const DEFAULT_ELASTIC_INDEX: &str = "sas-event-01";
pub const DEFAULT_BATCH_SIZE: usize = 90_000;

/// A blank value counts as missing.
fn required(field: &str, value: Option<String>) -> Result<String> {
    let value = value.filter(|v| !v.trim().is_empty());
    validate_required_field(field, &value).cloned()
}

#[derive(Debug, Clone)]
pub struct NetboxSettings {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl NetboxSettings {
    pub fn resolve(
        url: Option<String>,
        token: Option<String>,
        timeout_secs: Option<u64>,
        file: &FileConfig,
    ) -> Result<Self> {
        let url = required("netbox.url", url.or_else(|| file.netbox.url.clone()))?;
        let token = required("netbox.token", token.or_else(|| file.netbox.token.clone()))?;
        let timeout_secs = timeout_secs
            .or(file.netbox.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let settings = Self {
            url: normalize_base_url("netbox.url", &url)?,
            token,
            timeout: Duration::from_secs(timeout_secs),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for NetboxSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("netbox.token", &self.token)?;
        validate_positive_number("netbox.timeout_secs", self.timeout.as_secs() as usize, 1)
    }
}

#[derive(Debug, Clone)]
pub struct ElasticSettings {
    pub url: String,
    pub index: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub batch_size: usize,
}

impl ElasticSettings {
    pub fn resolve(
        url: Option<String>,
        index: Option<String>,
        batch_size: Option<usize>,
        file: &FileConfig,
    ) -> Result<Self> {
        let section = &file.elasticsearch;
        let url = url
            .or_else(|| section.url.clone())
            .unwrap_or_else(|| DEFAULT_ELASTIC_URL.to_string());

        let settings = Self {
            url: normalize_base_url("elasticsearch.url", &url)?,
            index: index
                .or_else(|| section.index.clone())
                .unwrap_or_else(|| DEFAULT_ELASTIC_INDEX.to_string()),
            username: section.username.clone(),
            password: section.password.clone(),
            ca_cert: section.ca_cert.clone(),
            batch_size: batch_size
                .or(section.batch_size)
                .unwrap_or(DEFAULT_BATCH_SIZE),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ElasticSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("elasticsearch.index", &self.index)?;
        validate_positive_number("elasticsearch.batch_size", self.batch_size, 1)?;
        if let Some(ca_cert) = &self.ca_cert {
            crate::utils::validation::validate_input_file(
                "elasticsearch.ca_cert",
                &ca_cert.display().to_string(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StidSettings {
    pub url: String,
    pub token: String,
}

impl StidSettings {
    pub fn resolve(url: Option<String>, token: Option<String>, file: &FileConfig) -> Result<Self> {
        let url = required("stid.url", url.or_else(|| file.stid.url.clone()))?;
        Ok(Self {
            url: normalize_base_url("stid.url", &url)?,
            token: required("stid.token", token.or_else(|| file.stid.token.clone()))?,
        })
    }
}
