use crate::utils::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest 802.1Q VLAN id usable on an interface.
pub const MAX_VID: u16 = 4094;

/// A VLAN membership as written in device exports: `10T` tagged, `10U` untagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VlanTag {
    Tagged(u16),
    Untagged(u16),
}

impl VlanTag {
    pub fn vid(&self) -> u16 {
        match self {
            Self::Tagged(vid) | Self::Untagged(vid) => *vid,
        }
    }

    pub fn is_tagged(&self) -> bool {
        matches!(self, Self::Tagged(_))
    }
}

impl fmt::Display for VlanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tagged(vid) => write!(f, "{}T", vid),
            Self::Untagged(vid) => write!(f, "{}U", vid),
        }
    }
}

impl FromStr for VlanTag {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || ReconcileError::parse("VLAN tag", format!("'{}' is not <vid>T or <vid>U", s));

        let suffix = s.chars().last().ok_or_else(invalid)?;
        let number = &s[..s.len() - suffix.len_utf8()];
        let vid = parse_vid(number).map_err(|_| invalid())?;
        match suffix {
            'T' | 't' => Ok(Self::Tagged(vid)),
            'U' | 'u' => Ok(Self::Untagged(vid)),
            _ => Err(invalid()),
        }
    }
}

/// Parses a single VLAN id and checks it is in 1..=4094.
pub fn parse_vid(s: &str) -> Result<u16> {
    let vid: u16 = s
        .trim()
        .parse()
        .map_err(|_| ReconcileError::parse("VLAN id", format!("'{}' is not a number", s.trim())))?;
    if vid == 0 || vid > MAX_VID {
        return Err(ReconcileError::parse(
            "VLAN id",
            format!("{} is outside 1-{}", vid, MAX_VID),
        ));
    }
    Ok(vid)
}

/// Parses `"10U,20T,30T"`. An empty string means no VLANs.
pub fn parse_vlan_tags(list: &str) -> Result<Vec<VlanTag>> {
    list.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(VlanTag::from_str)
        .collect()
}

/// Comma-joined rendering used in difference tables.
pub fn format_vids(vids: &[u16]) -> String {
    vids.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterfaceStatus {
    #[default]
    Enabled,
    Disabled,
}

/// An interface as seen on the device side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub description: String,
    pub vlans: Vec<VlanTag>,
    /// Set when the source VLAN membership could not be read; VLANs are then left alone.
    pub vlans_unknown: bool,
    pub status: InterfaceStatus,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == InterfaceStatus::Enabled
    }

    pub fn untagged_vlan(&self) -> Option<u16> {
        self.vlans.iter().find(|t| !t.is_tagged()).map(VlanTag::vid)
    }

    pub fn tagged_vlans(&self) -> Vec<u16> {
        self.vlans
            .iter()
            .filter(|t| t.is_tagged())
            .map(VlanTag::vid)
            .collect()
    }
}

/// 802.1Q mode of an IPAM interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceMode {
    Access,
    Tagged,
    TaggedAll,
}

/// Desired changes to one IPAM interface. `Some(None)` on mode and untagged VLAN means clear it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceChange {
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub mode: Option<Option<InterfaceMode>>,
    pub untagged_vlan: Option<Option<u16>>,
    pub tagged_vlans: Option<Vec<u16>>,
}

impl InterfaceChange {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    /// Every VLAN id the change refers to, in order and without duplicates.
    pub fn referenced_vids(&self) -> Vec<u16> {
        let mut vids = Vec::new();
        if let Some(Some(vid)) = self.untagged_vlan {
            vids.push(vid);
        }
        if let Some(tagged) = &self.tagged_vlans {
            for vid in tagged {
                if !vids.contains(vid) {
                    vids.push(*vid);
                }
            }
        }
        vids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub interface_id: u64,
    /// Site of the owning device; scopes VLAN lookups to the site's region.
    pub site_id: Option<u64>,
    pub change: InterfaceChange,
}

/// One difference between a source (config file, export) and IPAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub host: String,
    pub object: String,
    pub title: String,
    pub config_value: String,
    pub ipam_value: String,
    pub fix: Option<Fix>,
}

impl Finding {
    pub fn report(
        host: impl Into<String>,
        object: impl Into<String>,
        title: impl Into<String>,
        config_value: impl Into<String>,
        ipam_value: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            object: object.into(),
            title: title.into(),
            config_value: config_value.into(),
            ipam_value: ipam_value.into(),
            fix: None,
        }
    }

    pub fn with_fix(
        mut self,
        interface_id: u64,
        site_id: Option<u64>,
        change: InterfaceChange,
    ) -> Self {
        self.fix = Some(Fix {
            interface_id,
            site_id,
            change,
        });
        self
    }
}

/// Whether differences are only reported, confirmed one by one, or pushed straight away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    #[default]
    ReportOnly,
    Interactive,
    Auto,
}

impl UpdatePolicy {
    pub fn from_flags(interactive: bool, auto_update: bool) -> Self {
        match (interactive, auto_update) {
            (_, true) => Self::Auto,
            (true, false) => Self::Interactive,
            (false, false) => Self::ReportOnly,
        }
    }

    pub fn may_update(&self) -> bool {
        !matches!(self, Self::ReportOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Source items compared.
    pub items: usize,
    pub findings: usize,
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn merge(&mut self, other: RunSummary) {
        self.items += other.items;
        self.findings += other.findings;
        self.applied += other.applied;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items, {} differences, {} updated, {} skipped, {} failed",
            self.items, self.findings, self.applied, self.skipped, self.failed
        )
    }
}
