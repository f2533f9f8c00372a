use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::handlers::{action_err, action_ok, now_unix};
use crate::models::agenda::{self, Agenda, AttachmentField};
use crate::storage::{AttachmentStore, EVIDENCE_PREFIX};

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct RemoveSupportDoc {
    pub path: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfQuery {
    pub csrf_token: String,
}

fn upload_error(e: AppError) -> HttpResponse {
    match e {
        AppError::Validation(msg) => action_err(StatusCode::BAD_REQUEST, &msg),
        AppError::NotFound => action_err(StatusCode::NOT_FOUND, "Not found"),
        other => {
            log::error!("Upload failed: {}", other);
            action_err(StatusCode::INTERNAL_SERVER_ERROR, "Upload failed")
        }
    }
}

fn load_agenda(conn: &rusqlite::Connection, id: &str) -> Result<Agenda, HttpResponse> {
    match agenda::find_by_id(conn, id) {
        Ok(Some(a)) => Ok(a),
        Ok(None) => Err(action_err(StatusCode::NOT_FOUND, "Agenda not found")),
        Err(e) => {
            log::error!("Failed to load agenda {}: {}", id, e);
            Err(action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load agenda"))
        }
    }
}

fn storage_prefix(a: &Agenda) -> &'static str {
    a.meeting_type_enum()
        .map(|t| t.storage_prefix())
        .unwrap_or("radir")
}

/// POST /agendas/{id}/attachments/{field} — raw upload body, filename in the
/// query string. Replaces (and removes) any previous file in the slot.
pub async fn upload_attachment(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<(String, String)>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &query.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let (id, field_raw) = path.into_inner();
    let Some(field) = AttachmentField::parse(&field_raw) else {
        return action_err(StatusCode::BAD_REQUEST, "Unknown attachment field");
    };

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in attachment upload: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };
    let row = match load_agenda(&conn, &id) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let old_path = match field {
        AttachmentField::ReviewDoc => row.review_doc_path.clone(),
        AttachmentField::ProposalNote => row.proposal_note_path.clone(),
        AttachmentField::Presentation => row.presentation_path.clone(),
    };

    let stored = match store.store(
        storage_prefix(&row),
        &id,
        field.as_str(),
        &query.filename,
        &body,
    ) {
        Ok(p) => p,
        Err(e) => return upload_error(e),
    };

    if let Err(e) = agenda::set_attachment(&conn, &id, field, &stored) {
        log::error!("Failed to record attachment for {}: {}", id, e);
        let _ = store.remove(&stored);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record attachment");
    }
    if !old_path.is_empty() {
        if let Err(e) = store.remove(&old_path) {
            log::warn!("Failed to remove replaced attachment {}: {}", old_path, e);
        }
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.attachment_uploaded",
        "agenda",
        &id,
        serde_json::json!({"field": field.as_str(), "path": stored}),
    );

    action_ok(serde_json::json!({
        "path": stored,
        "url": store.signed_url(&stored, now_unix()),
    }))
}

/// POST /agendas/{id}/attachments/{field}/remove — clear a slot and delete
/// the stored file. Re-derives readiness.
pub async fn remove_attachment(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<(String, String)>,
    query: web::Query<CsrfQuery>,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &query.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let (id, field_raw) = path.into_inner();
    let Some(field) = AttachmentField::parse(&field_raw) else {
        return action_err(StatusCode::BAD_REQUEST, "Unknown attachment field");
    };

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in attachment remove: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };
    let row = match load_agenda(&conn, &id) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let old_path = match field {
        AttachmentField::ReviewDoc => row.review_doc_path.clone(),
        AttachmentField::ProposalNote => row.proposal_note_path.clone(),
        AttachmentField::Presentation => row.presentation_path.clone(),
    };

    if let Err(e) = agenda::set_attachment(&conn, &id, field, "") {
        log::error!("Failed to clear attachment for {}: {}", id, e);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to clear attachment");
    }
    if !old_path.is_empty() {
        if let Err(e) = store.remove(&old_path) {
            log::warn!("Failed to remove attachment file {}: {}", old_path, e);
        }
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.attachment_removed",
        "agenda",
        &id,
        serde_json::json!({"field": field.as_str()}),
    );

    action_ok(serde_json::json!({}))
}

/// POST /agendas/{id}/support-docs — add one supplementary document.
pub async fn add_support_doc(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<String>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &query.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let id = path.into_inner();

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in support doc upload: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };
    let row = match load_agenda(&conn, &id) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let stored = match store.store(storage_prefix(&row), &id, "support", &query.filename, &body) {
        Ok(p) => p,
        Err(e) => return upload_error(e),
    };

    if let Err(e) = agenda::add_support_doc(&conn, &id, &stored) {
        log::error!("Failed to record support doc for {}: {}", id, e);
        let _ = store.remove(&stored);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record support doc");
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.support_doc_added",
        "agenda",
        &id,
        serde_json::json!({"path": stored}),
    );

    action_ok(serde_json::json!({
        "path": stored,
        "url": store.signed_url(&stored, now_unix()),
    }))
}

/// POST /agendas/{id}/support-docs/remove
pub async fn remove_support_doc(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<String>,
    payload: web::Json<RemoveSupportDoc>,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &payload.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let id = path.into_inner();

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in support doc remove: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };
    let row = match load_agenda(&conn, &id) {
        Ok(a) => a,
        Err(resp) => return resp,
    };
    if !row.support_docs().iter().any(|p| p == &payload.path) {
        return action_err(StatusCode::NOT_FOUND, "Support doc not found");
    }

    if let Err(e) = agenda::remove_support_doc(&conn, &id, &payload.path) {
        log::error!("Failed to drop support doc for {}: {}", id, e);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to remove support doc");
    }
    if let Err(e) = store.remove(&payload.path) {
        log::warn!("Failed to remove support doc file {}: {}", payload.path, e);
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.support_doc_removed",
        "agenda",
        &id,
        serde_json::json!({"path": payload.path}),
    );

    action_ok(serde_json::json!({}))
}

/// POST /agendas/{id}/follow-ups/{kind}/{index}/evidence — attach evidence to
/// one monev follow-up item. Evidence lives under its own storage prefix.
pub async fn upload_evidence(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<(String, String, usize)>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &query.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let (id, kind, index) = path.into_inner();

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in evidence upload: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };
    let row = match load_agenda(&conn, &id) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let mut decisions = row.decision_items();
    let mut directives = row.directive_items();
    let items = match kind.as_str() {
        "decision" => &mut decisions,
        "directive" => &mut directives,
        _ => return action_err(StatusCode::BAD_REQUEST, "Unknown follow-up kind"),
    };
    let Some(item) = items.get_mut(index) else {
        return action_err(StatusCode::BAD_REQUEST, "Follow-up index out of range");
    };

    let stored = match store.store(EVIDENCE_PREFIX, &id, &format!("{}-{}", kind, index), &query.filename, &body)
    {
        Ok(p) => p,
        Err(e) => return upload_error(e),
    };

    let old_path = std::mem::replace(&mut item.evidence_path, stored.clone());
    if let Err(e) = agenda::set_follow_ups(&conn, &id, &decisions, &directives) {
        log::error!("Failed to record evidence for {}: {}", id, e);
        let _ = store.remove(&stored);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to record evidence");
    }
    if !old_path.is_empty() {
        if let Err(e) = store.remove(&old_path) {
            log::warn!("Failed to remove replaced evidence {}: {}", old_path, e);
        }
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "monev.evidence_uploaded",
        "agenda",
        &id,
        serde_json::json!({"kind": kind, "index": index, "path": stored}),
    );

    action_ok(serde_json::json!({
        "path": stored,
        "url": store.signed_url(&stored, now_unix()),
    }))
}
