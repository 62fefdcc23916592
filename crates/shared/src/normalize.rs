//! Normalization of provisioning-service payloads into display models.
//!
//! The registry describes the same device through several resources
//! (individual enrollments, enrollment groups, registration states) whose
//! fields live at different depths and under different names. Everything here
//! is total: unknown shapes produce empty values, never errors.

use std::fmt::Display;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::{
    CanonicalRecord, DeviceListing, EnrollmentEntry, GroupEntry, LookupSummary, ProvisionSummary,
};

/// Placeholder shown for a timestamp that is absent.
pub const MISSING_DATE: &str = "-";

const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One place a canonical field may be found, as a path of object keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate(pub &'static [&'static str]);

impl Candidate {
    /// Walks the path; JSON `null` counts as undefined.
    pub fn resolve<'a>(&self, entry: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(entry, |node, key| node.get(*key))
            .filter(|value| !value.is_null())
    }
}

pub const REGISTRATION_ID: &[Candidate] = &[
    Candidate(&["registrationId"]),
    Candidate(&["registrationState", "registrationId"]),
    Candidate(&["deviceId"]),
    Candidate(&["id"]),
];

pub const DEVICE_ID: &[Candidate] = &[
    Candidate(&["deviceId"]),
    Candidate(&["registrationState", "deviceId"]),
];

pub const ASSIGNED_HUB: &[Candidate] = &[
    Candidate(&["registrationState", "assignedHub"]),
    Candidate(&["assignedHub"]),
];

pub const STATUS: &[Candidate] = &[
    Candidate(&["registrationState", "status"]),
    Candidate(&["status"]),
    Candidate(&["provisioningStatus"]),
];

pub const PROVISIONING_STATUS: &[Candidate] = &[Candidate(&["provisioningStatus"])];

pub const CREATED: &[Candidate] = &[
    Candidate(&["createdDateTimeUtc"]),
    Candidate(&["registrationState", "createdDateTimeUtc"]),
    Candidate(&["created"]),
];

pub const UPDATED: &[Candidate] = &[
    Candidate(&["lastUpdatedDateTimeUtc"]),
    Candidate(&["registrationState", "lastUpdatedDateTimeUtc"]),
    Candidate(&["updatedDateTimeUtc"]),
];

pub const REPROVISION_POLICY: &[Candidate] = &[
    Candidate(&["reprovisionPolicy"]),
    Candidate(&["reprovisioningPolicy"]),
];

pub const IOTHUBS: &[Candidate] = &[
    Candidate(&["iotHubs"]),
    Candidate(&["allocationPolicy", "iotHubs"]),
    Candidate(&["iotHubsList"]),
];

const INDIVIDUAL_KEYS: &[&str] = &["individual_enrollments", "registrations", "registrationsList"];
const GROUP_KEYS: &[&str] = &["enrollment_groups", "enrollments", "enrollmentGroups"];

const GROUP_TITLE: &[Candidate] = &[Candidate(&["enrollmentGroupId"]), Candidate(&["groupId"])];
const GROUP_DESCRIPTION: &[Candidate] = &[
    Candidate(&["description"]),
    Candidate(&["attestation", "type"]),
];

const PROVISION_STATUS: &[Candidate] = &[
    Candidate(&["deviceResult", "status"]),
    Candidate(&["message"]),
];
const PROVISION_HUB: &[Candidate] = &[Candidate(&["hubResourceName"]), Candidate(&["iothub"])];

const LOOKUP_REG_ID: &[Candidate] = &[Candidate(&["regId"])];

const PROVISION_DEFAULT_STATUS: &str = "Completed";
const ENABLED: &str = "enabled";

/// Coerces any payload into an ordered list of entries.
///
/// Sequences pass through, `{ "value": [...] }` pages are unwrapped and a bare
/// object becomes a one-element list. Anything else is empty.
pub fn ensure_array(possible: Option<&Value>) -> Vec<Value> {
    match possible {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => match map.get("value") {
            Some(Value::Array(items)) => items.clone(),
            _ => vec![Value::Object(map.clone())],
        },
        _ => Vec::new(),
    }
}

/// Maps one enrollment or registration entry to its canonical fields.
pub fn extract_fields(entry: &Value) -> CanonicalRecord {
    let status = first_text(entry, STATUS);
    let provisioning_status = first_text(entry, PROVISIONING_STATUS).or_else(|| {
        // Only the top-level status feeds the fallback.
        (entry.get("status").and_then(Value::as_str) == Some(ENABLED)).then(|| ENABLED.to_string())
    });

    CanonicalRecord {
        registration_id: first_text(entry, REGISTRATION_ID),
        device_id: first_text(entry, DEVICE_ID),
        assigned_hub: first_text(entry, ASSIGNED_HUB),
        status,
        provisioning_status,
        created: first_text(entry, CREATED),
        updated: first_text(entry, UPDATED),
        reprovision_policy: first_defined(entry, REPROVISION_POLICY).cloned(),
        iothubs: IOTHUBS
            .iter()
            .find_map(|candidate| candidate.resolve(entry).and_then(as_text_list)),
    }
}

/// First candidate that resolves to anything other than `null`.
pub fn first_defined<'a>(entry: &'a Value, candidates: &[Candidate]) -> Option<&'a Value> {
    candidates
        .iter()
        .find_map(|candidate| candidate.resolve(entry))
}

/// First candidate that resolves to a scalar, rendered as text.
///
/// Objects and arrays do not qualify, so a later scalar candidate wins over
/// an earlier structured one.
pub fn first_text(entry: &Value, candidates: &[Candidate]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| candidate.resolve(entry).and_then(as_text))
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn as_text_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(as_text).collect())
}

fn as_status_code(value: Option<&Value>) -> Option<u16> {
    value
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
}

/// Formats a timestamp in the local time zone.
pub fn short_date(timestamp: Option<&str>) -> String {
    short_date_in(timestamp, &Local)
}

/// Formats a timestamp in `tz`. Absent input gives [`MISSING_DATE`]; input
/// that does not parse is returned as-is.
pub fn short_date_in<Tz>(timestamp: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(raw) = timestamp.filter(|raw| !raw.is_empty()) else {
        return MISSING_DATE.to_string();
    };

    match parse_timestamp(raw.trim()) {
        Some(parsed) => parsed
            .with_timezone(tz)
            .format(DATE_DISPLAY_FORMAT)
            .to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Offsetless timestamps are taken as UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Splits a list-all response into individual enrollments and groups.
pub fn split_envelope(data: &Value) -> DeviceListing {
    let individual_source = pick_collection(data, INDIVIDUAL_KEYS).or(Some(data));
    let group_source = pick_collection(data, GROUP_KEYS);

    let individual_enrollments = ensure_array(individual_source)
        .into_iter()
        .map(|raw| EnrollmentEntry {
            record: extract_fields(&raw),
            raw,
        })
        .collect();

    let enrollment_groups = ensure_array(group_source)
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let record = extract_fields(&raw);
            let title = first_text(&raw, GROUP_TITLE)
                .or_else(|| record.registration_id.clone())
                .unwrap_or_else(|| format!("group-{index}"));
            let description = first_text(&raw, GROUP_DESCRIPTION).unwrap_or_default();
            GroupEntry {
                title,
                description,
                record,
                raw,
            }
        })
        .collect();

    DeviceListing {
        individual_enrollments,
        enrollment_groups,
        individual_enrollments_status: as_status_code(data.get("individual_enrollments_status")),
        enrollment_groups_status: as_status_code(data.get("enrollment_groups_status")),
    }
}

fn pick_collection<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| data.get(*key).filter(|value| !value.is_null()))
}

pub fn summarize_provision(response: &Value) -> ProvisionSummary {
    ProvisionSummary {
        status: first_text(response, PROVISION_STATUS)
            .unwrap_or_else(|| PROVISION_DEFAULT_STATUS.to_string()),
        hub: first_text(response, PROVISION_HUB),
    }
}

pub fn summarize_lookup(response: &Value) -> LookupSummary {
    let registration = defined(response.get("registration")).cloned();
    let enrollment = defined(response.get("enrollment")).cloned();
    let registration_fields = registration
        .as_ref()
        .map(extract_fields)
        .unwrap_or_default();

    LookupSummary {
        reg_id: first_text(response, LOOKUP_REG_ID),
        found_in_dps: response
            .get("foundInDps")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        registration_http_status: as_status_code(response.get("registration_http_status")),
        enrollment_http_status: as_status_code(response.get("enrollment_http_status")),
        registration,
        enrollment,
        registration_fields,
    }
}

fn defined(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
