//! OCSF (Open Cybersecurity Schema Framework) structured event logging.
//!
//! Every authentication outcome and guard decision is emitted via
//! `tracing::info!` as structured JSON. Never panics; serialisation
//! errors are dropped.

use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

// OCSF event class UIDs
pub const CLASS_AUTHENTICATION: u32 = 3001;

// Activity IDs
pub const ACTIVITY_LOGON: u32 = 1;
pub const ACTIVITY_OTHER: u32 = 99; // Authorization decisions

// Status IDs
pub const STATUS_SUCCESS: u32 = 1;
pub const STATUS_FAILURE: u32 = 2;

// Severity IDs
pub const SEVERITY_INFORMATIONAL: u32 = 1;
pub const SEVERITY_LOW: u32 = 2;
pub const SEVERITY_MEDIUM: u32 = 3;
pub const SEVERITY_HIGH: u32 = 4;

pub const AUTH_PROTOCOL_OTHER: u32 = 99;
pub const AUTH_PROTOCOL_NAME: &str = "OpenAM SSO";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn severity_name(id: u32) -> &'static str {
    match id {
        SEVERITY_INFORMATIONAL => "Informational",
        SEVERITY_LOW => "Low",
        SEVERITY_MEDIUM => "Medium",
        SEVERITY_HIGH => "High",
        5 => "Critical",
        _ => "Unknown",
    }
}

fn status_name(id: u32) -> &'static str {
    match id {
        STATUS_SUCCESS => "Success",
        _ => "Failure",
    }
}

fn metadata(strategy: &str) -> serde_json::Value {
    json!({
        "product": {
            "name": "openam-strategy",
            "version": env!("CARGO_PKG_VERSION"),
            "vendor_name": "OpenAM Strategy"
        },
        "labels": [format!("strategy:{strategy}")]
    })
}

fn actor(user_email: Option<&str>) -> Option<serde_json::Value> {
    user_email.map(|email| {
        json!({
            "user": {
                "email_addr": email,
                "type_id": 1,
                "type": "User"
            }
        })
    })
}

/// Emit an OCSF event as structured JSON via tracing. Never panics.
fn emit(event: &serde_json::Value) {
    if let Ok(json) = serde_json::to_string(event) {
        tracing::info!(target: "ocsf", "{}", json);
    }
}

/// Build an OCSF Authentication (3001) logon event.
pub fn authentication_event_json(
    strategy: &str,
    status_id: u32,
    severity_id: u32,
    user_email: Option<&str>,
    message: &str,
) -> serde_json::Value {
    let mut event = json!({
        "class_uid": CLASS_AUTHENTICATION,
        "class_name": "Authentication",
        "activity_id": ACTIVITY_LOGON,
        "activity_name": "Logon",
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": metadata(strategy),
        "auth_protocol_id": AUTH_PROTOCOL_OTHER,
        "auth_protocol": AUTH_PROTOCOL_NAME,
        "message": message,
    });

    if let Some(actor) = actor(user_email) {
        event["actor"] = actor;
    }

    event
}

/// Emit an OCSF Authentication (3001) logon event.
pub fn authentication_event(
    strategy: &str,
    status_id: u32,
    severity_id: u32,
    user_email: Option<&str>,
    message: &str,
) {
    emit(&authentication_event_json(
        strategy,
        status_id,
        severity_id,
        user_email,
        message,
    ));
}

/// Emit an OCSF Authorization event (class 3001, activity 99/Other).
pub fn authorization_event(required_roles: &[String], groups: &[String], decision: &str) {
    let permitted = decision == "permit";
    let (status_id, severity_id) = if permitted {
        (STATUS_SUCCESS, SEVERITY_INFORMATIONAL)
    } else {
        (STATUS_FAILURE, SEVERITY_MEDIUM)
    };

    let event = json!({
        "class_uid": CLASS_AUTHENTICATION,
        "class_name": "Authentication",
        "activity_id": ACTIVITY_OTHER,
        "activity_name": "Other",
        "severity_id": severity_id,
        "severity": severity_name(severity_id),
        "status_id": status_id,
        "status": status_name(status_id),
        "time": now_millis(),
        "metadata": {
            "product": {
                "name": "openam-strategy",
                "version": env!("CARGO_PKG_VERSION"),
                "vendor_name": "OpenAM Strategy"
            },
            "authorization": {
                "required_roles": required_roles,
                "groups": groups,
                "decision": decision,
            }
        },
        "message": format!("Role authorization: {decision}"),
    });

    emit(&event);
}
