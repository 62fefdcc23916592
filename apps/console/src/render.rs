//! Text cards for each view.

use serde_json::Value;
use shared::{
    domain::{
        CanonicalRecord, DeviceListing, EnrollmentEntry, GroupEntry, LookupSummary,
        ProvisionSummary,
    },
    normalize::short_date,
    protocol::ViewKind,
};

pub const PLACEHOLDER: &str = "—";

const INDENT: &str = "    ";

fn or_placeholder(value: Option<&str>) -> &str {
    value.unwrap_or(PLACEHOLDER)
}

fn code_or_placeholder(code: Option<u16>) -> String {
    code.map(|code| code.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn heading(view: ViewKind) -> String {
    format!("== {} ==", view.title())
}

pub fn render_provision(summary: &ProvisionSummary) -> String {
    [
        format!("Status: {}", summary.status),
        format!("Hub: {}", or_placeholder(summary.hub.as_deref())),
    ]
    .join("\n")
}

pub fn render_lookup(summary: &LookupSummary) -> String {
    let mut lines = vec![
        format!("Reg ID: {}", or_placeholder(summary.reg_id.as_deref())),
        format!(
            "Found in DPS: {}",
            if summary.found_in_dps { "Yes" } else { "No" }
        ),
        format!(
            "Registration status: {}",
            code_or_placeholder(summary.registration_http_status)
        ),
        format!(
            "Enrollment status: {}",
            code_or_placeholder(summary.enrollment_http_status)
        ),
    ];
    let fields = &summary.registration_fields;
    if let Some(hub) = &fields.assigned_hub {
        lines.push(format!("Assigned Hub: {hub}"));
    }
    if let Some(device_id) = &fields.device_id {
        lines.push(format!("Device ID: {device_id}"));
    }
    lines.join("\n")
}

pub fn render_listing(listing: &DeviceListing) -> String {
    let mut lines = vec![section_heading(
        "Individual Enrollments",
        listing.individual_enrollments_status,
    )];
    if listing.individual_enrollments.is_empty() {
        lines.push("No individual enrollments found.".to_string());
    }
    for entry in &listing.individual_enrollments {
        lines.extend(enrollment_card(entry));
    }

    lines.push(String::new());
    lines.push(section_heading(
        "Enrollment Groups",
        listing.enrollment_groups_status,
    ));
    if listing.enrollment_groups.is_empty() {
        lines.push("No enrollment groups found.".to_string());
    }
    for group in &listing.enrollment_groups {
        lines.extend(group_card(group));
    }

    lines.join("\n")
}

fn section_heading(title: &str, upstream_status: Option<u16>) -> String {
    match upstream_status {
        Some(status) if !(200..300).contains(&status) => {
            format!("-- {title} (registry answered {status}) --")
        }
        _ => format!("-- {title} --"),
    }
}

fn badges(record: &CanonicalRecord) -> String {
    [&record.status, &record.provisioning_status]
        .into_iter()
        .flatten()
        .map(|badge| format!("[{badge}]"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn dates(record: &CanonicalRecord) -> String {
    format!(
        "Created: {}  Last updated: {}",
        short_date(record.created.as_deref()),
        short_date(record.updated.as_deref())
    )
}

fn enrollment_card(entry: &EnrollmentEntry) -> Vec<String> {
    let record = &entry.record;
    let mut lines = vec![format!(
        "* {}",
        or_placeholder(record.registration_id.as_deref())
    )];

    let hub = record
        .assigned_hub
        .as_deref()
        .map(|hub| format!("  Hub: {hub}"))
        .unwrap_or_default();
    lines.push(format!(
        "{INDENT}Device ID: {}{hub}",
        or_placeholder(record.device_id.as_deref())
    ));

    let badges = badges(record);
    if !badges.is_empty() {
        lines.push(format!("{INDENT}{badges}"));
    }
    if let Some(hubs) = record.iothubs.as_ref().filter(|hubs| !hubs.is_empty()) {
        lines.push(format!("{INDENT}IoT Hubs: {}", hubs.join(", ")));
    }

    let reprovision = record
        .reprovision_policy
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    lines.push(format!(
        "{INDENT}{}  Reprovision: {reprovision}",
        dates(record)
    ));
    lines
}

fn group_card(group: &GroupEntry) -> Vec<String> {
    let mut lines = vec![format!("* {}", group.title)];
    if !group.description.is_empty() {
        lines.push(format!("{INDENT}{}", group.description));
    }
    if let Some(status) = &group.record.status {
        lines.push(format!("{INDENT}[{status}]"));
    }
    lines.push(format!("{INDENT}{}", dates(&group.record)));
    lines
}

pub fn render_raw(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
