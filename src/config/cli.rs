//! Command-line arguments shared by the binaries.

use super::file::FileConfig;
use super::settings::{NetboxSettings, DEFAULT_CONFIG_FILE};
use crate::domain::model::UpdatePolicy;
use crate::utils::error::{ReconcileError, Result};
use crate::utils::logger;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    pub log_json: bool,
}

impl CommonArgs {
    /// Sets up logging and colours. Call once, first thing in `main`.
    pub fn init(&self) {
        logger::init(self.verbose, self.log_json);
        if self.no_color {
            colored::control::set_override(false);
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to TOML configuration file [default: ipam-reconcile.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<FileConfig> {
        match &self.config {
            Some(path) => FileConfig::load(path, true),
            None => FileConfig::load(Path::new(DEFAULT_CONFIG_FILE), false),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct NetboxArgs {
    /// IPAM base URL, e.g. https://ipam.example.com
    #[arg(short, long)]
    pub url: Option<String>,

    /// IPAM API token
    #[arg(short, long)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl NetboxArgs {
    pub fn settings(&self) -> Result<NetboxSettings> {
        let file = self.config.load()?;
        NetboxSettings::resolve(self.url.clone(), self.token.clone(), self.timeout_secs, &file)
    }
}

#[derive(Debug, Clone, Copy, Args)]
pub struct UpdateArgs {
    /// Ask before each update of IPAM
    #[arg(short, long)]
    pub interactive: bool,

    /// Update IPAM without asking
    #[arg(short, long)]
    pub autoupdate: bool,
}

impl UpdateArgs {
    pub fn policy(&self) -> UpdatePolicy {
        UpdatePolicy::from_flags(self.interactive, self.autoupdate)
    }
}

/// Reports a configuration problem and exits.
pub fn config_failure(e: ReconcileError) -> ! {
    tracing::error!("Configuration validation failed: {}", e);
    tracing::error!("Suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}

/// Reports a failed run and exits with the code for its severity.
pub fn run_failure(e: ReconcileError) -> ! {
    tracing::error!(
        "Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    std::process::exit(e.exit_code());
}
