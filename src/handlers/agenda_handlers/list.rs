use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::agenda::{self, AgendaStatus, MeetingType};
use crate::models::stats;
use crate::templates_structs::{AgendaListTemplate, AgendaRowView, PageContext};

use super::session_label;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub meeting_type: Option<String>,
}

/// GET /agendas — all agendas, optionally filtered by status and type.
/// Unknown filter values are ignored rather than erroring.
pub async fn list(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "agendas")?;

    let status_filter = query
        .status
        .as_deref()
        .and_then(AgendaStatus::parse)
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();
    let type_filter = query
        .meeting_type
        .as_deref()
        .and_then(MeetingType::parse)
        .map(|t| t.as_str().to_string())
        .unwrap_or_default();

    let conn = pool.get()?;
    let agendas = agenda::list_filtered(
        &conn,
        (!status_filter.is_empty()).then_some(status_filter.as_str()),
        (!type_filter.is_empty()).then_some(type_filter.as_str()),
    )?;

    let rows = agendas
        .iter()
        .map(|a| AgendaRowView {
            id: a.id.clone(),
            title: a.title.clone(),
            meeting_type: a
                .meeting_type_enum()
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| a.meeting_type.clone()),
            status: a
                .status_enum()
                .map(|s| s.label().to_string())
                .unwrap_or_else(|| a.status.clone()),
            execution_date: a.execution_date.clone(),
            session_label: session_label(a),
            monev_summary: stats::monev_summary(a),
        })
        .collect();

    let tmpl = AgendaListTemplate {
        ctx,
        agendas: rows,
        status_filter,
        type_filter,
    };
    render(tmpl)
}
