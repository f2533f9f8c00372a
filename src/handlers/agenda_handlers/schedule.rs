use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::{require_user, set_flash};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::agenda::{self, AgendaStatus};

use super::{CsrfOnly, redirect};

#[derive(Deserialize)]
pub struct ScheduleForm {
    pub execution_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub method: Option<String>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub meeting_number: String,
    pub meeting_year: String,
    pub csrf_token: String,
}

fn validate_schedule(form: &ScheduleForm) -> Result<(i64, i64), String> {
    if NaiveDate::parse_from_str(form.execution_date.trim(), "%Y-%m-%d").is_err() {
        return Err("Invalid execution date, expected YYYY-MM-DD".to_string());
    }
    let number: i64 = form
        .meeting_number
        .trim()
        .parse()
        .map_err(|_| "Meeting number must be numeric".to_string())?;
    if number < 1 {
        return Err("Meeting number must be positive".to_string());
    }
    let year: i64 = form
        .meeting_year
        .trim()
        .parse()
        .map_err(|_| "Meeting year must be numeric".to_string())?;
    if !(1000..=9999).contains(&year) {
        return Err("Meeting year must be a 4-digit year".to_string());
    }
    Ok((number, year))
}

/// POST /agendas/{id}/schedule — assign the agenda to a meeting session.
pub async fn schedule(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<ScheduleForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user_id = require_user(&session)?;
    let id = path.into_inner();

    let conn = pool.get()?;
    if agenda::find_by_id(&conn, &id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let (number, year) = match validate_schedule(&form) {
        Ok(v) => v,
        Err(msg) => {
            set_flash(&session, &msg);
            return Ok(redirect(&format!("/agendas/{}", id)));
        }
    };

    agenda::set_schedule(
        &conn,
        &id,
        form.execution_date.trim(),
        form.start_time.as_deref().unwrap_or_default().trim(),
        form.end_time.as_deref().unwrap_or_default().trim(),
        form.method.as_deref().unwrap_or_default().trim(),
        form.location.as_deref().unwrap_or_default().trim(),
        form.meeting_link.as_deref().unwrap_or_default().trim(),
        number,
        year,
    )?;

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.scheduled",
        "agenda",
        &id,
        serde_json::json!({
            "execution_date": form.execution_date.trim(),
            "meeting_number": number,
            "meeting_year": year,
        }),
    );

    set_flash(&session, "Agenda scheduled");
    Ok(redirect(&format!("/agendas/{}", id)))
}

/// Shared body of the cancel/postpone/resume status actions.
async fn set_status_action(
    pool: web::Data<DbPool>,
    session: Session,
    id: String,
    csrf_token: &str,
    status: AgendaStatus,
    action: &str,
    flash: &str,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, csrf_token)?;
    let user_id = require_user(&session)?;

    let conn = pool.get()?;
    if agenda::find_by_id(&conn, &id)?.is_none() {
        return Err(AppError::NotFound);
    }

    agenda::update_status(&conn, &id, status)?;

    let _ = crate::audit::log(
        &conn,
        user_id,
        action,
        "agenda",
        &id,
        serde_json::json!({"status": status.as_str()}),
    );

    set_flash(&session, flash);
    Ok(redirect(&format!("/agendas/{}", id)))
}

/// POST /agendas/{id}/cancel
pub async fn cancel(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_status_action(
        pool,
        session,
        path.into_inner(),
        &form.csrf_token,
        AgendaStatus::Dibatalkan,
        "agenda.cancelled",
        "Agenda cancelled",
    )
    .await
}

/// POST /agendas/{id}/postpone
pub async fn postpone(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    set_status_action(
        pool,
        session,
        path.into_inner(),
        &form.csrf_token,
        AgendaStatus::Ditunda,
        "agenda.postponed",
        "Agenda postponed",
    )
    .await
}

/// POST /agendas/{id}/resume — bring a postponed agenda back. Returns to
/// DIJADWALKAN when a schedule is still on the row, otherwise back to the
/// readiness-derived pre-schedule status.
pub async fn resume(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user_id = require_user(&session)?;
    let id = path.into_inner();

    let conn = pool.get()?;
    let row = agenda::find_by_id(&conn, &id)?.ok_or(AppError::NotFound)?;

    let target = if !row.execution_date.is_empty() {
        AgendaStatus::Dijadwalkan
    } else {
        row.readiness_status()
    };
    agenda::update_status(&conn, &id, target)?;

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.resumed",
        "agenda",
        &id,
        serde_json::json!({"status": target.as_str()}),
    );

    set_flash(&session, "Agenda resumed");
    Ok(redirect(&format!("/agendas/{}", id)))
}
