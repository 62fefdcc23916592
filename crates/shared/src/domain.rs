use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display-ready view of one enrollment or registration, whatever shape the
/// provisioning service returned it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub registration_id: Option<String>,
    pub device_id: Option<String>,
    pub assigned_hub: Option<String>,
    pub status: Option<String>,
    pub provisioning_status: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub reprovision_policy: Option<Value>,
    pub iothubs: Option<Vec<String>>,
}

impl CanonicalRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of the auto-create-and-provision call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionSummary {
    pub status: String,
    pub hub: Option<String>,
}

/// Outcome of a single registration lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupSummary {
    pub reg_id: Option<String>,
    pub found_in_dps: bool,
    pub registration_http_status: Option<u16>,
    pub enrollment_http_status: Option<u16>,
    pub registration: Option<Value>,
    pub enrollment: Option<Value>,
    /// Fields pulled out of `registration`.
    pub registration_fields: CanonicalRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentEntry {
    pub record: CanonicalRecord,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    pub title: String,
    pub description: String,
    pub record: CanonicalRecord,
    pub raw: Value,
}

/// Both collections of the list-all response, normalized independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListing {
    pub individual_enrollments: Vec<EnrollmentEntry>,
    pub enrollment_groups: Vec<GroupEntry>,
    pub individual_enrollments_status: Option<u16>,
    pub enrollment_groups_status: Option<u16>,
}

impl DeviceListing {
    pub fn is_empty(&self) -> bool {
        self.individual_enrollments.is_empty() && self.enrollment_groups.is_empty()
    }
}
