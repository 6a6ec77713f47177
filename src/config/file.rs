use crate::utils::error::{ReconcileError, Result};
use crate::utils::validation::{normalize_base_url, validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Contents of `ipam-reconcile.toml`. Every value is optional; command-line flags win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub netbox: NetboxSection,
    #[serde(default)]
    pub elasticsearch: ElasticSection,
    #[serde(default)]
    pub stid: StidSection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetboxSection {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElasticSection {
    pub url: Option<String>,
    pub index: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ca_cert: Option<PathBuf>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StidSection {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl FileConfig {
    /// Loads `path`. A missing file is only an error when the user named it.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            tracing::debug!("No config file at {}, using flags and defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::from_file(path)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReconcileError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ReconcileError::InvalidConfigValueError {
            field: "toml".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for FileConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.netbox.url {
            normalize_base_url("netbox.url", url)?;
        }
        if let Some(timeout) = self.netbox.timeout_secs {
            validate_positive_number("netbox.timeout_secs", timeout as usize, 1)?;
        }
        if let Some(url) = &self.elasticsearch.url {
            normalize_base_url("elasticsearch.url", url)?;
        }
        if let Some(batch_size) = self.elasticsearch.batch_size {
            validate_positive_number("elasticsearch.batch_size", batch_size, 1)?;
        }
        if let Some(url) = &self.stid.url {
            normalize_base_url("stid.url", url)?;
        }
        Ok(())
    }
}
