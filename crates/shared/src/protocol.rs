use serde::{Deserialize, Serialize};

pub const PROVISION_PATH: &str = "/api/AutoCreateHubAndProvisionDevice";
pub const LOOKUP_PATH: &str = "/api/LookupDpsDevice";
pub const LIST_PATH: &str = "/api/ListDpsDevices";

/// Query parameter carrying the registration id.
pub const REG_ID_PARAM: &str = "regId";

pub const MISSING_REG_ID_MESSAGE: &str = "Enter a registration/device id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Registration,
    Search,
    List,
}

impl ViewKind {
    pub fn path(self) -> &'static str {
        match self {
            ViewKind::Registration => PROVISION_PATH,
            ViewKind::Search => LOOKUP_PATH,
            ViewKind::List => LIST_PATH,
        }
    }

    pub fn requires_reg_id(self) -> bool {
        !matches!(self, ViewKind::List)
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Registration => "Device Registration (auto-provision)",
            ViewKind::Search => "DPS Search",
            ViewKind::List => "All DPS Devices",
        }
    }

    /// Label of the trigger control while the view is idle or settled.
    pub fn action_label(self) -> &'static str {
        match self {
            ViewKind::Registration => "Register & Provision",
            ViewKind::Search => "Search DPS",
            ViewKind::List => "Load all DPS items",
        }
    }

    /// Label of the trigger control while a request is in flight.
    pub fn loading_label(self) -> &'static str {
        match self {
            ViewKind::Registration => "Working...",
            ViewKind::Search => "Searching...",
            ViewKind::List => "Loading...",
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ViewKind::Registration => "registration",
            ViewKind::Search => "search",
            ViewKind::List => "list",
        };
        f.write_str(name)
    }
}
