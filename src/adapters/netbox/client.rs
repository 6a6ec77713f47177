use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::*;
use crate::config::settings::NetboxSettings;
use crate::utils::error::{ReconcileError, Result};

/// Page size used when reading every IP address in one sweep.
pub const BULK_PAGE_SIZE: u32 = 5000;

type Query<'q> = [(&'q str, String)];

/// NetBox REST client. Requests are issued one at a time.
pub struct NetboxClient {
    base_url: String,
    token: String,
    client: Client,
}

impl NetboxClient {
    pub fn new(settings: &NetboxSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ReconcileError::ApiError {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    /// One page of a list endpoint.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<Paginated<T>> {
        let builder = self.request(Method::GET, &self.api_url(path)).query(query);
        self.send(builder).await
    }

    /// Every result of a list endpoint, following `next` links.
    pub async fn list_all<T: DeserializeOwned>(&self, path: &str, query: &Query<'_>) -> Result<Vec<T>> {
        let mut page: Paginated<T> = self.list_page(path, query).await?;
        let mut results = std::mem::take(&mut page.results);

        while let Some(next) = page.next.take() {
            page = self.send(self.request(Method::GET, &next)).await?;
            results.append(&mut page.results);
        }
        Ok(results)
    }

    /// Raw JSON of a list endpoint, as returned.
    pub async fn raw_list(&self, path: &str, query: &Query<'_>) -> Result<serde_json::Value> {
        let builder = self.request(Method::GET, &self.api_url(path)).query(query);
        self.send(builder).await
    }

    async fn create<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let builder = self.request(Method::POST, &self.api_url(path)).json(body);
        self.send(builder).await
    }

    // --- Devices ---

    pub async fn devices_by_name(&self, name: &str) -> Result<Vec<NbDevice>> {
        let page = self
            .list_page("/dcim/devices/", &[("name", name.to_string())])
            .await?;
        Ok(page.results)
    }

    pub async fn device_by_id(&self, id: u64) -> Result<Option<NbDevice>> {
        let page: Paginated<NbDevice> = self
            .list_page("/dcim/devices/", &[("id", id.to_string())])
            .await?;
        Ok(page.results.into_iter().next())
    }

    pub async fn device_type(&self, id: u64) -> Result<Option<NbDeviceType>> {
        let page: Paginated<NbDeviceType> = self
            .list_page("/dcim/device-types/", &[("id", id.to_string())])
            .await?;
        Ok(page.results.into_iter().next())
    }

    /// Looks up `wanted` in a catalog, ignoring case.
    pub async fn find_named(&self, catalog: Catalog, wanted: &str) -> Result<Option<NamedObject>> {
        let items: Vec<serde_json::Value> = self.list_all(catalog.endpoint(), &[]).await?;
        let wanted = wanted.trim().to_lowercase();

        Ok(items.into_iter().find_map(|item| {
            let name = item.get(catalog.key())?.as_str()?;
            if name.to_lowercase() != wanted {
                return None;
            }
            Some(NamedObject {
                id: item.get("id")?.as_u64()?,
                name: name.to_string(),
            })
        }))
    }

    pub async fn create_device(&self, device: &DeviceCreate) -> Result<NbDevice> {
        self.create("/dcim/devices/", device).await
    }

    // --- Interfaces ---

    pub async fn interfaces(&self, device_id: u64) -> Result<Vec<NbInterface>> {
        self.list_all("/dcim/interfaces/", &[("device_id", device_id.to_string())])
            .await
    }

    pub async fn patch_interface(&self, id: u64, patch: &InterfacePatch) -> Result<NbInterface> {
        let url = self.api_url(&format!("/dcim/interfaces/{}/", id));
        self.send(self.request(Method::PATCH, &url).json(patch)).await
    }

    // --- IP addresses and prefixes ---

    pub async fn ip_addresses(&self, address: &str) -> Result<Vec<NbIpAddress>> {
        let page = self
            .list_page("/ipam/ip-addresses/", &[("address", address.to_string())])
            .await?;
        Ok(page.results)
    }

    pub async fn all_ip_addresses(&self) -> Result<Vec<NbIpAddress>> {
        self.list_all("/ipam/ip-addresses/", &[("limit", BULK_PAGE_SIZE.to_string())])
            .await
    }

    pub async fn prefixes_containing(&self, ip: &str) -> Result<Vec<NbPrefix>> {
        let page = self
            .list_page("/ipam/prefixes/", &[("contains", ip.to_string())])
            .await?;
        Ok(page.results)
    }

    // --- Sites and VLANs ---

    pub async fn site(&self, id: u64) -> Result<Option<NbSite>> {
        let page: Paginated<NbSite> = self
            .list_page("/dcim/sites/", &[("id", id.to_string())])
            .await?;
        Ok(page.results.into_iter().next())
    }

    pub async fn vlan_groups_in_region(&self, region_id: u64) -> Result<Vec<NbVlanGroup>> {
        self.list_all(
            "/ipam/vlan-groups/",
            &[
                ("scope_type", "dcim.region".to_string()),
                ("scope_id", region_id.to_string()),
            ],
        )
        .await
    }

    /// VLANs with any of `vids`, limited to `group_ids` unless that is empty.
    pub async fn vlans(&self, group_ids: &[u64], vids: &[u16]) -> Result<Vec<NbVlan>> {
        let query: Vec<(&str, String)> = group_ids
            .iter()
            .map(|id| ("group_id", id.to_string()))
            .chain(vids.iter().map(|vid| ("vid", vid.to_string())))
            .collect();
        self.list_all("/ipam/vlans/", &query).await
    }

    /// Number of VLANs with this vid anywhere in IPAM.
    pub async fn vlan_count(&self, vid: u16) -> Result<u64> {
        let page: Paginated<serde_json::Value> = self
            .list_page(
                "/ipam/vlans/",
                &[("vid", vid.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        Ok(page.count)
    }

    pub async fn create_vlan(&self, vlan: &VlanCreate) -> Result<NbVlan> {
        self.create("/ipam/vlans/", vlan).await
    }
}
