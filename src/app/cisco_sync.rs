use crate::adapters::netbox::types::{Catalog, DeviceCreate, NamedObject, NbDevice};
use crate::adapters::netbox::NetboxClient;
use crate::core::diff::{compare_interface, DiffContext};
use crate::domain::device::DeviceConfig;
use crate::domain::model::{Finding, UpdatePolicy};
use crate::domain::ports::{Prompter, Reconciler};
use crate::parsers::cisco::parse_config_file;
use crate::utils::error::{ReconcileError, Result};
use async_trait::async_trait;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Reconciles Cisco running-configs with the matching IPAM devices.
pub struct CiscoSync {
    netbox: Arc<NetboxClient>,
    prompter: Arc<dyn Prompter>,
    policy: UpdatePolicy,
    paths: Vec<PathBuf>,
    verbose: bool,
}

impl CiscoSync {
    pub fn new(
        netbox: Arc<NetboxClient>,
        prompter: Arc<dyn Prompter>,
        policy: UpdatePolicy,
        paths: Vec<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            netbox,
            prompter,
            policy,
            paths,
            verbose,
        }
    }

    /// Finds the device by hostname, offering to create it when missing.
    async fn ipam_device(&self, config: &DeviceConfig) -> Result<Option<NbDevice>> {
        let devices = self.netbox.devices_by_name(&config.hostname).await?;
        if let Some(device) = devices.into_iter().next() {
            return Ok(Some(device));
        }

        println!("Device not found in IPAM {}", config.hostname);
        let create = match self.policy {
            UpdatePolicy::ReportOnly => false,
            UpdatePolicy::Auto => true,
            UpdatePolicy::Interactive => self
                .prompter
                .confirm("Would you like to add this device to IPAM [y/N]")?,
        };
        if !create {
            return Ok(None);
        }
        self.create_device(&config.hostname).await
    }

    async fn lookup(&self, catalog: Catalog, question: &str) -> Result<Option<NamedObject>> {
        let answer = self.prompter.ask(question)?;
        let found = self.netbox.find_named(catalog, &answer).await?;
        if found.is_none() {
            println!(
                "{}",
                format!("{}: {}, does not exist in IPAM. Skipping device", catalog, answer).red()
            );
        }
        Ok(found)
    }

    async fn create_device(&self, hostname: &str) -> Result<Option<NbDevice>> {
        let Some(device_type) = self.lookup(Catalog::DeviceTypes, "Device type").await? else {
            return Ok(None);
        };
        let Some(role) = self.lookup(Catalog::DeviceRoles, "Device Role").await? else {
            return Ok(None);
        };
        let Some(site) = self.lookup(Catalog::Sites, "Site").await? else {
            return Ok(None);
        };

        tracing::debug!(
            "Creating {} as {} / {} at {}",
            hostname,
            device_type.name,
            role.name,
            site.name
        );
        let created = self
            .netbox
            .create_device(&DeviceCreate {
                name: hostname.to_string(),
                device_type: device_type.id,
                role: role.id,
                site: site.id,
            })
            .await?;
        println!("{} {}", hostname.cyan(), "successfully added to IPAM".green());

        // The create response does not always carry the nested site.
        Ok(Some(
            self.netbox.device_by_id(created.id).await?.unwrap_or(created),
        ))
    }
}

#[async_trait]
impl Reconciler for CiscoSync {
    type Item = DeviceConfig;

    fn name(&self) -> &str {
        "cisco-to-ipam"
    }

    async fn extract(&self) -> Result<Vec<DeviceConfig>> {
        if let Some(bad) = self.paths.iter().find(|p| !p.is_file()) {
            return Err(ReconcileError::InvalidConfigValueError {
                field: "config file".to_string(),
                value: bad.display().to_string(),
                reason: "is not a valid file or does not exist".to_string(),
            });
        }

        let mut configs = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            println!("{} {}", "Parsing configuration:".bold(), path.display().to_string().cyan());
            let config = parse_config_file(path)?;
            println!("Host - {}", config.hostname.green());
            if self.verbose {
                println!("{}\n", config.summary());
            }
            configs.push(config);
        }
        Ok(configs)
    }

    async fn compare(&self, config: &DeviceConfig) -> Result<Vec<Finding>> {
        let Some(device) = self.ipam_device(config).await? else {
            return Ok(Vec::new());
        };

        let ipam_interfaces = self.netbox.interfaces(device.id).await?;
        let source_interfaces = config.interfaces();
        if ipam_interfaces.is_empty() {
            println!("No interfaces found in IPAM. Please create them.");
        }
        if ipam_interfaces.len() != source_interfaces.len() {
            println!(
                "{}",
                format!(
                    "IPAM interface count mismatch: {} != {}",
                    ipam_interfaces.len(),
                    source_interfaces.len()
                )
                .yellow()
            );
        }

        let ctx = DiffContext {
            host: &config.hostname,
            site_id: device.site_id(),
        };
        let findings = ipam_interfaces
            .iter()
            .filter_map(|ipam| {
                source_interfaces
                    .iter()
                    .find(|source| source.name == ipam.name)
                    .map(|source| compare_interface(ctx, source, ipam))
            })
            .flatten()
            .collect();
        Ok(findings)
    }
}
