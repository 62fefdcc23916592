//! The three console views, each owning its own fetch state.

use std::future::Future;

use serde_json::Value;
use shared::{
    domain::{DeviceListing, LookupSummary, ProvisionSummary},
    normalize::{split_envelope, summarize_lookup, summarize_provision},
    protocol::{ViewKind, MISSING_REG_ID_MESSAGE},
};

use crate::{error::ClientError, fetch_state::FetchController, ProvisioningApi};

/// Trims the identifier and rejects it when nothing is left.
pub fn validate_reg_id(input: &str) -> Result<&str, ClientError> {
    let reg_id = input.trim();
    if reg_id.is_empty() {
        return Err(ClientError::Validation(MISSING_REG_ID_MESSAGE.to_string()));
    }
    Ok(reg_id)
}

async fn submit_with_reg_id<'a, F, Fut>(
    controller: &FetchController<Value>,
    input: &'a str,
    request: F,
) where
    F: FnOnce(&'a str) -> Fut,
    Fut: Future<Output = Result<Value, ClientError>>,
{
    match validate_reg_id(input) {
        Ok(reg_id) => controller.run(request(reg_id)).await,
        Err(err) => controller.reject(err.to_string()),
    }
}

pub struct RegistrationView {
    controller: FetchController<Value>,
}

impl Default for RegistrationView {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationView {
    pub fn new() -> Self {
        Self {
            controller: FetchController::new(ViewKind::Registration),
        }
    }

    pub fn controller(&self) -> &FetchController<Value> {
        &self.controller
    }

    pub async fn provision(&self, api: &dyn ProvisioningApi, reg_id: &str) {
        submit_with_reg_id(&self.controller, reg_id, |reg_id| api.provision_device(reg_id)).await;
    }

    pub fn summary(&self) -> Option<ProvisionSummary> {
        self.controller.map_result(summarize_provision)
    }
}

pub struct SearchView {
    controller: FetchController<Value>,
}

impl Default for SearchView {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchView {
    pub fn new() -> Self {
        Self {
            controller: FetchController::new(ViewKind::Search),
        }
    }

    pub fn controller(&self) -> &FetchController<Value> {
        &self.controller
    }

    pub async fn search(&self, api: &dyn ProvisioningApi, reg_id: &str) {
        submit_with_reg_id(&self.controller, reg_id, |reg_id| api.lookup_device(reg_id)).await;
    }

    pub fn summary(&self) -> Option<LookupSummary> {
        self.controller.map_result(summarize_lookup)
    }
}

pub struct ListView {
    controller: FetchController<Value>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    pub fn new() -> Self {
        Self {
            controller: FetchController::new(ViewKind::List),
        }
    }

    pub fn controller(&self) -> &FetchController<Value> {
        &self.controller
    }

    pub async fn load_all(&self, api: &dyn ProvisioningApi) {
        self.controller.run(api.list_devices()).await;
    }

    /// Normalized listing; empty until a load has succeeded.
    pub fn listing(&self) -> DeviceListing {
        self.controller
            .map_result(split_envelope)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/views_tests.rs"]
mod tests;
