use crate::adapters::netbox::types::{NbVlanGroup, VlanCreate, VlanStatus};
use crate::adapters::netbox::{NbVlan, NetboxClient};
use crate::core::table::render_table;
use crate::domain::model::UpdatePolicy;
use crate::domain::ports::Prompter;
use crate::utils::error::{ReconcileError, Result};
use colored::Colorize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// VLAN groups scoped to the region of one site.
#[derive(Debug, Clone, Default)]
struct RegionScope {
    region_name: String,
    groups: Vec<NbVlanGroup>,
}

/// Turns VLAN ids (vids) into IPAM object ids.
///
/// With a site, only VLAN groups of the site's region are searched; without one
/// the lookup is global. Resolved vids are remembered per site.
pub struct VlanResolver {
    netbox: Arc<NetboxClient>,
    prompter: Arc<dyn Prompter>,
    policy: UpdatePolicy,
    scopes: HashMap<u64, RegionScope>,
    resolved: HashMap<Option<u64>, HashMap<u16, u64>>,
}

impl VlanResolver {
    pub fn new(netbox: Arc<NetboxClient>, prompter: Arc<dyn Prompter>, policy: UpdatePolicy) -> Self {
        Self {
            netbox,
            prompter,
            policy,
            scopes: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// Ids for every vid that could be resolved. Vids missing from the result are unresolved.
    pub async fn resolve(&mut self, site_id: Option<u64>, vids: &[u16]) -> Result<HashMap<u16, u64>> {
        let mut missing: Vec<u16> = vids
            .iter()
            .copied()
            .filter(|vid| {
                !self
                    .resolved
                    .get(&site_id)
                    .is_some_and(|known| known.contains_key(vid))
            })
            .collect();
        missing.sort_unstable();
        missing.dedup();

        if !missing.is_empty() {
            let found = self.lookup(site_id, &missing).await?;
            self.resolved.entry(site_id).or_default().extend(found);
        }

        let known = self.resolved.get(&site_id);
        Ok(vids
            .iter()
            .filter_map(|vid| known.and_then(|k| k.get(vid)).map(|id| (*vid, *id)))
            .collect())
    }

    async fn lookup(&mut self, site_id: Option<u64>, vids: &[u16]) -> Result<HashMap<u16, u64>> {
        let scope = match site_id {
            Some(id) => self.scope(id).await?,
            None => RegionScope::default(),
        };
        let group_ids: Vec<u64> = scope.groups.iter().map(|g| g.id).collect();

        let mut by_vid: BTreeMap<u16, Vec<NbVlan>> = BTreeMap::new();
        for vlan in self.netbox.vlans(&group_ids, vids).await? {
            by_vid.entry(vlan.vid).or_default().push(vlan);
        }

        let duplicates: Vec<u16> = by_vid
            .iter()
            .filter(|(_, vlans)| vlans.len() > 1)
            .map(|(vid, _)| *vid)
            .collect();
        if !duplicates.is_empty() {
            println!(
                "\n{}",
                format!("Duplicate VLAN IDs {:?} found in the same region in IPAM...", duplicates)
                    .yellow()
            );
        }

        let mut found = HashMap::new();
        for vid in vids {
            let id = match by_vid.get(vid).map(Vec::as_slice) {
                Some([vlan]) => Some(vlan.id),
                Some(candidates) if candidates.len() > 1 => {
                    self.pick_duplicate(*vid, candidates, &scope.region_name)?
                }
                _ => {
                    println!("VLAN{} not found in IPAM", vid);
                    let create = self.policy == UpdatePolicy::Interactive
                        && self
                            .prompter
                            .confirm(&format!("Do you want to create VLAN{} in IPAM? [y/N]", vid))?;
                    if create {
                        self.create(*vid, &scope).await?
                    } else {
                        None
                    }
                }
            };
            if let Some(id) = id {
                found.insert(*vid, id);
            }
        }
        Ok(found)
    }

    async fn scope(&mut self, site_id: u64) -> Result<RegionScope> {
        if let Some(scope) = self.scopes.get(&site_id) {
            return Ok(scope.clone());
        }

        let site = self
            .netbox
            .site(site_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFoundError {
                kind: "Site".to_string(),
                name: site_id.to_string(),
            })?;

        let scope = match site.region {
            Some(region) => {
                let groups = self.netbox.vlan_groups_in_region(region.id).await?;
                if groups.is_empty() {
                    tracing::warn!(
                        "No VLAN groups in region {} of site {}, looking VLANs up globally",
                        region.name,
                        site.name
                    );
                }
                RegionScope {
                    region_name: region.name,
                    groups,
                }
            }
            None => {
                tracing::warn!("Site {} has no region, looking VLANs up globally", site.name);
                RegionScope::default()
            }
        };

        self.scopes.insert(site_id, scope.clone());
        Ok(scope)
    }

    fn pick_duplicate(&self, vid: u16, candidates: &[NbVlan], region: &str) -> Result<Option<u64>> {
        let rows: Vec<Vec<String>> = candidates
            .iter()
            .enumerate()
            .map(|(i, vlan)| {
                vec![
                    (i + 1).to_string(),
                    vlan.name.clone(),
                    vlan.vid.to_string(),
                    vlan.description.clone(),
                    vlan.group.as_ref().map(|g| g.name.clone()).unwrap_or_default(),
                    region.to_string(),
                ]
            })
            .collect();
        println!(
            "\n{}",
            render_table(
                "Multiple VLANS",
                &["#", "Name", "Vlan ID", "Vlan Description", "Group", "Region"],
                &rows,
            )
        );

        if self.policy != UpdatePolicy::Interactive {
            println!(
                "{}",
                format!("Cannot choose between duplicates of VLAN{}, removing it from the update", vid)
                    .red()
            );
            return Ok(None);
        }

        let options: Vec<String> = rows.iter().map(|r| format!("{} ({})", r[1], r[4])).collect();
        let choice = self
            .prompter
            .choose(&format!("Which VLAN{} do you want to use?", vid), &options)?;
        Ok(choice.and_then(|i| candidates.get(i)).map(|v| v.id))
    }

    async fn create(&self, vid: u16, scope: &RegionScope) -> Result<Option<u64>> {
        if self.netbox.vlan_count(vid).await? != 0 {
            println!("Cannot create vlan{}. It already exists. Check VLAN Groups", vid);
            return Ok(None);
        }

        let name = self.prompter.ask("Vlan Name")?;
        let statuses: Vec<String> = VlanStatus::ALL.iter().map(ToString::to_string).collect();
        let Some(status) = self
            .prompter
            .choose("Choose a status", &statuses)?
            .and_then(|i| VlanStatus::ALL.get(i).copied())
        else {
            return Ok(None);
        };

        let group = if scope.groups.is_empty() {
            println!(
                "{}",
                "Could not find any VLAN groups for the site the device is located. Skipping vlan group..."
                    .yellow()
            );
            None
        } else {
            let names: Vec<String> = scope.groups.iter().map(|g| g.name.clone()).collect();
            match self.prompter.choose("Choose a VLAN Group", &names)? {
                Some(i) => scope.groups.get(i).map(|g| g.id),
                None => return Ok(None),
            }
        };

        let body = VlanCreate {
            name,
            vid,
            status,
            group,
        };
        match self.netbox.create_vlan(&body).await {
            Ok(vlan) => {
                println!("{}", format!("Successfully created VLAN{} in IPAM", vid).green());
                Ok(Some(vlan.id))
            }
            Err(e) => {
                println!("{}", format!("VLAN creation failed. {}", e).red());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::prompt::ScriptedPrompter;
    use crate::config::settings::NetboxSettings;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn resolver(server: &MockServer, prompter: Arc<ScriptedPrompter>, policy: UpdatePolicy) -> VlanResolver {
        let netbox = NetboxClient::new(&NetboxSettings {
            url: server.base_url(),
            token: "t".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        VlanResolver::new(Arc::new(netbox), prompter, policy)
    }

    fn mock_region(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/dcim/sites/").query_param("id", "4");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 4, "name": "KAA", "region": {"id": 8, "name": "West"}}]
            }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/ipam/vlan-groups/")
                .query_param("scope_id", "8");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 3, "name": "west-ot"}]
            }));
        });
    }

    #[tokio::test]
    async fn test_resolves_within_region_and_memoises() {
        let server = MockServer::start();
        mock_region(&server);
        let vlans = server.mock(|when, then| {
            when.method(GET)
                .path("/api/ipam/vlans/")
                .query_param("group_id", "3");
            then.status(200).json_body(json!({
                "count": 2, "next": null, "previous": null,
                "results": [{"id": 110, "vid": 10, "name": "a"}, {"id": 120, "vid": 20, "name": "b"}]
            }));
        });

        let prompter = Arc::new(ScriptedPrompter::default());
        let mut resolver = resolver(&server, prompter, UpdatePolicy::Auto);

        let ids = resolver.resolve(Some(4), &[10, 20]).await.unwrap();
        assert_eq!(ids.get(&10), Some(&110));
        assert_eq!(ids.get(&20), Some(&120));

        let again = resolver.resolve(Some(4), &[20]).await.unwrap();
        assert_eq!(again.len(), 1);
        vlans.assert_hits(1);
    }

    #[tokio::test]
    async fn test_duplicates_unresolved_without_prompt() {
        let server = MockServer::start();
        mock_region(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/ipam/vlans/");
            then.status(200).json_body(json!({
                "count": 2, "next": null, "previous": null,
                "results": [
                    {"id": 1, "vid": 30, "name": "x", "group": {"id": 3, "name": "west-ot"}},
                    {"id": 2, "vid": 30, "name": "y", "group": {"id": 3, "name": "west-ot"}}
                ]
            }));
        });

        let prompter = Arc::new(ScriptedPrompter::default());
        let mut resolver = resolver(&server, prompter.clone(), UpdatePolicy::Auto);
        assert!(resolver.resolve(Some(4), &[30]).await.unwrap().is_empty());
        assert!(prompter.questions().is_empty());
    }

    #[tokio::test]
    async fn test_interactive_duplicate_choice() {
        let server = MockServer::start();
        mock_region(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/ipam/vlans/");
            then.status(200).json_body(json!({
                "count": 2, "next": null, "previous": null,
                "results": [{"id": 1, "vid": 30, "name": "x"}, {"id": 2, "vid": 30, "name": "y"}]
            }));
        });

        let prompter = Arc::new(ScriptedPrompter::new(["2"]));
        let mut resolver = resolver(&server, prompter, UpdatePolicy::Interactive);
        let ids = resolver.resolve(Some(4), &[30]).await.unwrap();
        assert_eq!(ids.get(&30), Some(&2));
    }

    #[tokio::test]
    async fn test_interactive_creation() {
        let server = MockServer::start();
        mock_region(&server);
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/ipam/vlans/")
                .query_param("group_id", "3");
            then.status(200)
                .json_body(json!({"count": 0, "next": null, "previous": null, "results": []}));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/ipam/vlans/")
                .query_param("limit", "1");
            then.status(200)
                .json_body(json!({"count": 0, "next": null, "previous": null, "results": []}));
        });
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/api/ipam/vlans/")
                .json_body(json!({"name": "ot-cams", "vid": 40, "status": "reserved", "group": 3}));
            then.status(201).json_body(json!({"id": 140, "vid": 40, "name": "ot-cams"}));
        });

        let prompter = Arc::new(ScriptedPrompter::new(["y", "ot-cams", "2", "1"]));
        let mut resolver = resolver(&server, prompter, UpdatePolicy::Interactive);
        let ids = resolver.resolve(Some(4), &[40]).await.unwrap();

        create.assert();
        assert_eq!(ids.get(&40), Some(&140));
    }
}
