use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::{action_err, action_ok, now_unix};
use crate::models::agenda::{self, AgendaStatus, FollowUpItem};
use crate::models::stats;
use crate::storage::AttachmentStore;
use crate::templates_structs::{MonevEntryView, MonevItemView, MonevTemplate, PageContext};

use super::session_label;

#[derive(Deserialize)]
pub struct FollowUpUpdate {
    /// "decision" or "directive".
    pub kind: String,
    pub index: usize,
    pub status: String,
    pub csrf_token: String,
}

fn item_views(items: Vec<FollowUpItem>, store: &AttachmentStore, now: u64) -> Vec<MonevItemView> {
    items
        .into_iter()
        .map(|item| MonevItemView {
            evidence_url: if item.evidence_path.is_empty() {
                String::new()
            } else {
                store.signed_url(&item.evidence_path, now)
            },
            description: item.description,
            pic: item.pic,
            due_date: item.due_date,
            status: item.status,
        })
        .collect()
}

/// GET /monev — follow-up board over every completed meeting.
pub async fn monev_page(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "monev")?;

    let conn = pool.get()?;
    let completed = agenda::list_filtered(
        &conn,
        Some(AgendaStatus::RapatSelesai.as_str()),
        None,
    )?;

    let now = now_unix();
    let entries = completed
        .iter()
        .map(|a| MonevEntryView {
            id: a.id.clone(),
            title: a.title.clone(),
            meeting_type: a
                .meeting_type_enum()
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| a.meeting_type.clone()),
            session_label: session_label(a),
            monev_status: a.monev_status.clone(),
            summary: stats::monev_summary(a),
            decisions: item_views(a.decision_items(), &store, now),
            directives: item_views(a.directive_items(), &store, now),
        })
        .collect();

    render(MonevTemplate { ctx, entries })
}

/// POST /monev/{id} — set the status of one follow-up item and recompute the
/// agenda's overall monev status.
pub async fn monev_update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    payload: web::Json<FollowUpUpdate>,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &payload.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let id = path.into_inner();

    let status = payload.status.trim();
    if status.is_empty() {
        return action_err(StatusCode::BAD_REQUEST, "Status must not be empty");
    }

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in monev update: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };

    let row = match agenda::find_by_id(&conn, &id) {
        Ok(Some(a)) => a,
        Ok(None) => return action_err(StatusCode::NOT_FOUND, "Agenda not found"),
        Err(e) => {
            log::error!("Failed to load agenda {}: {}", id, e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load agenda");
        }
    };

    let mut decisions = row.decision_items();
    let mut directives = row.directive_items();
    let items = match payload.kind.as_str() {
        "decision" => &mut decisions,
        "directive" => &mut directives,
        _ => return action_err(StatusCode::BAD_REQUEST, "Unknown follow-up kind"),
    };
    let Some(item) = items.get_mut(payload.index) else {
        return action_err(StatusCode::BAD_REQUEST, "Follow-up index out of range");
    };
    item.status = status.to_string();

    if let Err(e) = agenda::set_follow_ups(&conn, &id, &decisions, &directives) {
        log::error!("Failed to update follow-ups for {}: {}", id, e);
        return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save follow-up");
    }

    let monev = agenda::overall_monev_status(&decisions);

    let _ = crate::audit::log(
        &conn,
        user_id,
        "monev.updated",
        "agenda",
        &id,
        serde_json::json!({
            "kind": payload.kind,
            "index": payload.index,
            "status": status,
        }),
    );

    action_ok(serde_json::json!({"monev_status": monev.as_str()}))
}
