//! SoftLayer REST client
//!
//! Thin wrapper over the account and virtual-guest services. Every call
//! authenticates with HTTP basic auth (username / API key) and returns
//! typed records. Authorization failures are fatal; a missing object on
//! the per-instance OS lookup is not, it just means no OS group.

use crate::api::types::{
    HardwareInstance, OperatingSystemDetail, RawInstance, HARDWARE_MASK, OPERATING_SYSTEM_MASK,
    VIRTUAL_GUEST_MASK,
};
use crate::config::SoftLayerConfig;
use crate::error::{Error, Result};
use crate::inventory::OperatingSystemLookup;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Client for the SoftLayer REST API
pub struct SoftLayerClient {
    http: reqwest::Client,
    config: SoftLayerConfig,
}

impl SoftLayerClient {
    /// Create a client from resolved configuration
    pub fn new(config: SoftLayerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// All virtual guests on the account, masked to the inventory fields
    pub async fn list_virtual_guests(&self) -> Result<Vec<RawInstance>> {
        self.get_json(
            "SoftLayer_Account/getVirtualGuests.json",
            VIRTUAL_GUEST_MASK,
        )
        .await
    }

    /// All bare-metal servers on the account, converted to the common
    /// record shape
    pub async fn list_hardware(&self) -> Result<Vec<RawInstance>> {
        let servers: Vec<HardwareInstance> = self
            .get_json("SoftLayer_Account/getHardware.json", HARDWARE_MASK)
            .await?;
        Ok(servers
            .into_iter()
            .map(HardwareInstance::into_raw)
            .collect())
    }

    fn service_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint_url.trim_end_matches('/'),
            path
        )
    }

    async fn send(&self, path: &str, mask: &str) -> Result<Response> {
        let url = self.service_url(path);
        debug!("GET {}", url);
        Ok(self
            .http
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.api_key))
            .query(&[("objectMask", mask)])
            .send()
            .await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, mask: &str) -> Result<T> {
        let response = self.send(path, mask).await?;
        match response.status() {
            status if status.is_success() => Ok(response.json::<T>().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication),
            status => Err(Error::ApiStatus {
                service: path.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl OperatingSystemLookup for SoftLayerClient {
    async fn operating_system(&self, id: i64) -> Result<Option<String>> {
        let path = format!("SoftLayer_Virtual_Guest/{id}/getObject.json");
        let response = self.send(&path, OPERATING_SYSTEM_MASK).await?;
        match response.status() {
            status if status.is_success() => {
                let detail = response.json::<OperatingSystemDetail>().await?;
                Ok(detail.reference_code())
            }
            // bare-metal ids have no virtual guest record; no OS group
            StatusCode::NOT_FOUND => {
                debug!("No virtual guest record for instance {}", id);
                Ok(None)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Authentication),
            status => Err(Error::OsLookup {
                id,
                reason: format!("HTTP {}", status.as_u16()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(endpoint: &str) -> SoftLayerClient {
        SoftLayerClient::new(SoftLayerConfig {
            username: "user".to_string(),
            api_key: "key".to_string(),
            endpoint_url: endpoint.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_service_url_joins_cleanly() {
        let client = make_client("https://api.softlayer.com/rest/v3.1");
        assert_eq!(
            client.service_url("SoftLayer_Account/getVirtualGuests.json"),
            "https://api.softlayer.com/rest/v3.1/SoftLayer_Account/getVirtualGuests.json"
        );

        // trailing slash on the endpoint doesn't double up
        let client = make_client("https://api.softlayer.com/rest/v3.1/");
        assert_eq!(
            client.service_url("SoftLayer_Virtual_Guest/42/getObject.json"),
            "https://api.softlayer.com/rest/v3.1/SoftLayer_Virtual_Guest/42/getObject.json"
        );
    }
}
