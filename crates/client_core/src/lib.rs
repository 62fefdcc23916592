use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::protocol::{ViewKind, REG_ID_PARAM};
use tracing::{debug, warn};
use url::Url;

pub mod error;
pub mod fetch_state;
pub mod views;

pub use error::ClientError;
pub use fetch_state::{FetchController, FetchState};
pub use views::{validate_reg_id, ListView, RegistrationView, SearchView};

/// The provisioning backend as seen by the console: one GET per view.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn provision_device(&self, reg_id: &str) -> Result<Value, ClientError>;
    async fn lookup_device(&self, reg_id: &str) -> Result<Value, ClientError>;
    async fn list_devices(&self) -> Result<Value, ClientError>;
}

pub struct HttpProvisioningClient {
    http: Client,
    base_url: String,
}

impl HttpProvisioningClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|err| ClientError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, view: ViewKind) -> String {
        format!("{}{}", self.base_url, view.path())
    }

    async fn get_json(&self, view: ViewKind, reg_id: Option<&str>) -> Result<Value, ClientError> {
        let reg_id = if view.requires_reg_id() {
            Some(validate_reg_id(reg_id.unwrap_or_default())?)
        } else {
            None
        };

        let url = self.endpoint_url(view);
        let mut request = self.http.get(&url);
        if let Some(reg_id) = reg_id {
            request = request.query(&[(REG_ID_PARAM, reg_id)]);
        }

        debug!(%view, %url, reg_id = ?reg_id, "issuing request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%view, status = status.as_u16(), "provisioning backend returned an error");
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProvisioningApi for HttpProvisioningClient {
    async fn provision_device(&self, reg_id: &str) -> Result<Value, ClientError> {
        self.get_json(ViewKind::Registration, Some(reg_id)).await
    }

    async fn lookup_device(&self, reg_id: &str) -> Result<Value, ClientError> {
        self.get_json(ViewKind::Search, Some(reg_id)).await
    }

    async fn list_devices(&self) -> Result<Value, ClientError> {
        self.get_json(ViewKind::List, None).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
