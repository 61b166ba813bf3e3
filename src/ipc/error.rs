use serde_json::json;

use crate::store::StoreError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// A validation decline: the action simply did not happen. No state was
/// touched and nothing is logged.
pub fn declined(id: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, "validation", message, None)
}

/// Storage failures are always logged before being reported, unlike
/// validation declines.
pub fn storage_err(id: &str, code: &str, op: &str, e: StoreError) -> serde_json::Value {
    log::warn!("{} failed: {}", op, e);
    err(id, code, e.to_string(), Some(json!({ "op": op })))
}
