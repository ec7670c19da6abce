//! Consul catalog client.
//!
//! # Responsibilities
//! - Query `/v1/catalog/service/<name>` on a Consul agent
//! - Decode catalog entries into endpoints
//!
//! # Design Decisions
//! - `ServiceAddress` wins; the node `Address` is used when it is blank
//! - A bare `host:port` address is treated as plain HTTP
//! - Non-2xx responses are transport failures, not "not found"
//! - Talks to the agent directly; HTTP proxy settings are ignored

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::catalog::CatalogProvider;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::registry::Endpoint;

const TOKEN_HEADER: &str = "x-consul-token";

/// Parse a catalog address, defaulting to `http://` when no scheme is given.
pub fn parse_catalog_address(address: &str) -> Result<Url, url::ParseError> {
    let address = address.trim();
    if address.contains("://") {
        Url::parse(address)
    } else {
        Url::parse(&format!("http://{}", address))
    }
}

/// One row of a catalog service response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CatalogService {
    #[serde(default)]
    address: String,
    #[serde(default)]
    service_address: String,
    #[serde(default)]
    service_port: i64,
}

impl CatalogService {
    fn into_endpoint(self) -> Result<Endpoint, CatalogError> {
        let port = u16::try_from(self.service_port).map_err(|_| {
            CatalogError::InvalidResponse(format!("port out of range: {}", self.service_port))
        })?;
        let address = if self.service_address.is_empty() {
            self.address
        } else {
            self.service_address
        };
        Ok(Endpoint::new(address, port))
    }
}

/// Catalog provider backed by a Consul agent.
#[derive(Debug, Clone)]
pub struct ConsulCatalog {
    base: Url,
    datacenter: Option<String>,
    client: reqwest::Client,
}

impl ConsulCatalog {
    /// Create a client for the agent at `address`.
    pub fn new(address: &str, config: &CatalogConfig) -> Result<Self, CatalogError> {
        let base = parse_catalog_address(address)
            .map_err(|e| CatalogError::Unavailable(format!("invalid address '{}': {}", address, e)))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(token)
                .map_err(|e| CatalogError::Unavailable(format!("invalid token: {}", e)))?;
            headers.insert(TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        Ok(Self {
            base,
            datacenter: config.datacenter.clone().filter(|dc| !dc.is_empty()),
            client,
        })
    }

    /// Base URL of the agent.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn service_url(&self, service: &str) -> Result<Url, CatalogError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::Unavailable(format!("address cannot be a base: {}", self.base)))?
            .pop_if_empty()
            .extend(["v1", "catalog", "service", service]);
        if let Some(dc) = &self.datacenter {
            url.query_pairs_mut().append_pair("dc", dc);
        }
        Ok(url)
    }
}

#[async_trait]
impl CatalogProvider for ConsulCatalog {
    async fn lookup(&self, service: &str) -> Result<Vec<Endpoint>, CatalogError> {
        let url = self.service_url(service)?;
        tracing::trace!(service = %service, url = %url, "Querying Consul catalog");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Unavailable(format!("catalog returned status {}", status)));
        }

        let rows: Vec<CatalogService> = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        rows.into_iter().map(CatalogService::into_endpoint).collect()
    }

    fn name(&self) -> &'static str {
        "consul"
    }
}
