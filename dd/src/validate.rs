//! Wire payload validation
//!
//! Soft-fail schema checks for externally supplied payloads. A failing check
//! is logged and carried in the session creation response, but never blocks
//! the operation. A malformed creation payload still yields a usable session.

use serde_json::{Value, json};
use tracing::warn;

/// Schema id for the session-creation payload
pub const CREATE_SESSION_SCHEMA: &str = "create-session";

/// Outcome of validating one payload against a named schema
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationReport {
    pub schema_id: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok(schema_id: &str) -> Self {
        Self {
            schema_id: schema_id.to_string(),
            valid: true,
            errors: Vec::new(),
        }
    }

    fn failed(schema_id: &str, errors: Vec<String>) -> Self {
        Self {
            schema_id: schema_id.to_string(),
            valid: false,
            errors,
        }
    }
}

fn schema_for(schema_id: &str) -> Option<Value> {
    match schema_id {
        CREATE_SESSION_SCHEMA => Some(json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" },
                "document_type": { "type": "string", "pattern": "^[a-z0-9][a-z0-9-]*$" }
            },
            "additionalProperties": false
        })),
        _ => None,
    }
}

/// Validate a payload against a named schema
///
/// Uses jsonschema 0.29's `iter_errors` to collect every violation, not just
/// the first. Unknown schema ids and uncompilable schemas report as invalid
/// rather than panicking; the caller decides whether that matters.
pub fn validate_payload(payload: &Value, schema_id: &str) -> ValidationReport {
    let Some(schema) = schema_for(schema_id) else {
        return ValidationReport::failed(schema_id, vec![format!("unknown schema: {schema_id}")]);
    };

    match jsonschema::validator_for(&schema) {
        Ok(validator) => {
            let errors: Vec<String> = validator
                .iter_errors(payload)
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            if errors.is_empty() {
                ValidationReport::ok(schema_id)
            } else {
                ValidationReport::failed(schema_id, errors)
            }
        }
        Err(e) => ValidationReport::failed(schema_id, vec![format!("invalid schema: {e}")]),
    }
}

/// Log a failed report as warnings, one line per violation
pub fn warn_on_invalid(report: &ValidationReport) {
    if report.valid {
        return;
    }
    for error in &report.errors {
        warn!(schema = %report.schema_id, "payload validation: {error}");
    }
}
