use crate::adapters::netbox::{InterfacePatch, NetboxClient};
use crate::core::table::render_table;
use crate::core::vlans::VlanResolver;
use crate::domain::model::{Finding, InterfaceChange, RunSummary, UpdatePolicy};
use crate::domain::ports::Prompter;
use crate::utils::error::Result;
use colored::Colorize;
use std::collections::HashMap;
use std::sync::Arc;

/// How a finding is shown before any update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// Bordered `Host | Interface | Config | IPAM` table.
    #[default]
    Table,
    /// One line per finding.
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Reported,
    Applied,
    Skipped,
    Failed,
}

pub fn render_finding(finding: &Finding, style: ReportStyle) -> String {
    match style {
        ReportStyle::Table => render_table(
            &finding.title,
            &["Host", "Interface", "Config", "IPAM"],
            &[vec![
                finding.host.clone(),
                finding.object.clone(),
                finding.config_value.clone(),
                finding.ipam_value.clone(),
            ]],
        ),
        ReportStyle::Line => {
            let mut line = format!("{}: {}", finding.title, finding.host);
            if !finding.object.is_empty() {
                line.push(' ');
                line.push_str(&finding.object);
            }
            if !finding.config_value.is_empty() || !finding.ipam_value.is_empty() {
                line.push_str(&format!(
                    " \"{}\" != \"{}\"",
                    finding.config_value, finding.ipam_value
                ));
            }
            line
        }
    }
}

/// Turns a change into a PATCH body, or returns the vids that have no id.
pub fn build_patch(
    change: &InterfaceChange,
    ids: &HashMap<u16, u64>,
) -> std::result::Result<InterfacePatch, Vec<u16>> {
    let missing: Vec<u16> = change
        .referenced_vids()
        .into_iter()
        .filter(|vid| !ids.contains_key(vid))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let id = |vid: &u16| ids[vid];
    Ok(InterfacePatch {
        description: change.description.clone(),
        enabled: change.enabled,
        mode: change.mode,
        untagged_vlan: change.untagged_vlan.map(|v| v.as_ref().map(id)),
        tagged_vlans: change
            .tagged_vlans
            .as_ref()
            .map(|vids| vids.iter().map(id).collect()),
    })
}

/// Shows findings and, when the policy allows, pushes their fixes to IPAM.
pub struct FixApplier {
    netbox: Arc<NetboxClient>,
    prompter: Arc<dyn Prompter>,
    policy: UpdatePolicy,
    style: ReportStyle,
    vlans: VlanResolver,
}

impl FixApplier {
    pub fn new(
        netbox: Arc<NetboxClient>,
        prompter: Arc<dyn Prompter>,
        policy: UpdatePolicy,
        style: ReportStyle,
    ) -> Self {
        let vlans = VlanResolver::new(netbox.clone(), prompter.clone(), policy);
        Self {
            netbox,
            prompter,
            policy,
            style,
            vlans,
        }
    }

    pub async fn apply_all(&mut self, findings: &[Finding]) -> RunSummary {
        let mut summary = RunSummary {
            findings: findings.len(),
            ..Default::default()
        };
        for finding in findings {
            match self.apply(finding).await {
                Outcome::Reported => {}
                Outcome::Applied => summary.applied += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub async fn apply(&mut self, finding: &Finding) -> Outcome {
        match self.style {
            ReportStyle::Table => println!("\n{}", render_finding(finding, self.style)),
            ReportStyle::Line => println!("{}", render_finding(finding, self.style)),
        }

        let Some(fix) = &finding.fix else {
            return Outcome::Reported;
        };
        match self.policy {
            UpdatePolicy::ReportOnly => return Outcome::Reported,
            UpdatePolicy::Interactive => match self.prompter.confirm("Update IPAM? [y/N]") {
                Ok(true) => {}
                Ok(false) => return Outcome::Skipped,
                Err(e) => {
                    tracing::error!("Prompt failed: {}", e);
                    return Outcome::Failed;
                }
            },
            UpdatePolicy::Auto => {}
        }

        match self.push(fix.interface_id, fix.site_id, &fix.change).await {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("{}", format!("Patch failed. {}", e.user_friendly_message()).red());
                tracing::debug!("Patch of interface {} failed: {}", fix.interface_id, e);
                Outcome::Failed
            }
        }
    }

    async fn push(
        &mut self,
        interface_id: u64,
        site_id: Option<u64>,
        change: &InterfaceChange,
    ) -> Result<Outcome> {
        let vids = change.referenced_vids();
        let ids = if vids.is_empty() {
            HashMap::new()
        } else {
            self.vlans.resolve(site_id, &vids).await?
        };

        let patch = match build_patch(change, &ids) {
            Ok(patch) => patch,
            Err(missing) => {
                println!(
                    "{}",
                    format!("VLANs {:?} could not be resolved, interface not updated", missing)
                        .yellow()
                );
                return Ok(Outcome::Skipped);
            }
        };

        self.netbox.patch_interface(interface_id, &patch).await?;
        println!("{}", "Successfully updated IPAM".green());
        Ok(Outcome::Applied)
    }
}
