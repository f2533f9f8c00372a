pub mod agenda_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod files;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

/// Uniform JSON mutation result: `{"success": true, ...}`.
pub(crate) fn action_ok(extra: serde_json::Value) -> HttpResponse {
    let mut body = serde_json::json!({"success": true});
    if let (Some(obj), Some(extra_obj)) = (body.as_object_mut(), extra.as_object()) {
        for (k, v) in extra_obj {
            obj.insert(k.clone(), v.clone());
        }
    }
    HttpResponse::Ok()
        .content_type("application/json")
        .body(body.to_string())
}

/// Uniform JSON mutation failure: `{"success": false, "error": ...}`.
/// Every error leaving a JSON action endpoint goes through here; nothing is
/// thrown across the boundary.
pub(crate) fn action_err(status: StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("application/json")
        .body(serde_json::json!({"success": false, "error": error}).to_string())
}

/// Seconds since the Unix epoch, for signed URL stamping.
pub(crate) fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
