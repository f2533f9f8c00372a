use std::collections::BTreeMap;

use actix_session::Session;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::require_user;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::{action_err, action_ok};
use crate::models::agenda::{self, AgendaStatus, FollowUpItem};
use crate::models::user;
use crate::templates_structs::{MinutesAgendaView, MinutesTemplate, PageContext};

#[derive(Deserialize)]
pub struct MinutesAgendaPayload {
    pub id: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub decisions: Vec<FollowUpItem>,
    #[serde(default)]
    pub directives: Vec<FollowUpItem>,
    #[serde(default)]
    pub guests: Vec<String>,
}

#[derive(Deserialize)]
pub struct MinutesPayload {
    pub agendas: Vec<MinutesAgendaPayload>,
    #[serde(default)]
    pub attendance: BTreeMap<String, String>,
    #[serde(default)]
    pub finalize: bool,
    pub csrf_token: String,
}

/// GET /meetings/{year}/{number}/minutes — one editor over every agenda of
/// the session.
pub async fn minutes_page(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "agendas")?;
    let (year, number) = path.into_inner();

    let conn = pool.get()?;
    let rows = agenda::find_by_session(&conn, year, number)?;
    if rows.is_empty() {
        return Err(AppError::NotFound);
    }

    let directors: Vec<String> = user::list_directors(&conn)?
        .into_iter()
        .map(|u| u.full_name)
        .collect();

    // Attendance is written identically to every session row; show the first
    // non-empty map, with unrecorded directors blank.
    let recorded = rows
        .iter()
        .map(|a| a.attendance_map())
        .find(|m| !m.is_empty())
        .unwrap_or_default();
    let attendance: Vec<(String, String)> = directors
        .iter()
        .map(|name| {
            let status = recorded.get(name).cloned().unwrap_or_default();
            (name.clone(), status)
        })
        .collect();

    let agendas = rows
        .into_iter()
        .map(|a| MinutesAgendaView {
            decisions: a.decision_items(),
            directives: a.directive_items(),
            agenda: a,
        })
        .collect();

    let tmpl = MinutesTemplate {
        ctx,
        meeting_year: year,
        meeting_number: number,
        agendas,
        directors,
        attendance,
    };
    render(tmpl)
}

/// POST /meetings/{year}/{number}/minutes — persist the editor state for
/// every submitted agenda, and optionally finalize the whole session.
pub async fn minutes_save(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
    payload: web::Json<MinutesPayload>,
) -> HttpResponse {
    if csrf::validate_csrf(&session, &payload.csrf_token).is_err() {
        return action_err(StatusCode::FORBIDDEN, "Invalid CSRF token");
    }
    let user_id = match require_user(&session) {
        Ok(id) => id,
        Err(_) => return action_err(StatusCode::UNAUTHORIZED, "Not signed in"),
    };
    let (year, number) = path.into_inner();

    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Pool error in minutes save: {}", e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
        }
    };

    let session_rows = match agenda::find_by_session(&conn, year, number) {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("Failed to load session {}/{}: {}", number, year, e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load session");
        }
    };
    if session_rows.is_empty() {
        return action_err(StatusCode::NOT_FOUND, "Meeting session not found");
    }

    for entry in &payload.agendas {
        // Only rows of this session may be written through this endpoint.
        if !session_rows.iter().any(|a| a.id == entry.id) {
            return action_err(StatusCode::BAD_REQUEST, "Agenda is not part of this session");
        }
        if let Err(e) = agenda::save_minutes(
            &conn,
            &entry.id,
            &entry.notes,
            &entry.decisions,
            &entry.directives,
            &payload.attendance,
            &entry.guests,
        ) {
            log::error!("Failed to save minutes for {}: {}", entry.id, e);
            return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save minutes");
        }
    }

    if payload.finalize {
        for row in &session_rows {
            if let Err(e) = agenda::update_status(&conn, &row.id, AgendaStatus::RapatSelesai) {
                log::error!("Failed to finalize {}: {}", row.id, e);
                return action_err(StatusCode::INTERNAL_SERVER_ERROR, "Failed to finalize session");
            }
        }
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        if payload.finalize {
            "minutes.finalized"
        } else {
            "minutes.saved"
        },
        "meeting_session",
        &format!("{}/{}", number, year),
        serde_json::json!({
            "agendas": payload.agendas.len(),
            "finalize": payload.finalize,
        }),
    );

    action_ok(serde_json::json!({}))
}
