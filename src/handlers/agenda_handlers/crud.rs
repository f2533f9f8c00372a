use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::auth::csrf;
use crate::auth::session::{require_user, set_flash};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::now_unix;
use crate::models::agenda::{self, Agenda, AttachmentField, MeetingType, NewAgenda};
use crate::models::stats;
use crate::storage::AttachmentStore;
use crate::templates_structs::{
    AgendaDetailTemplate, AgendaFormTemplate, AttachmentView, PageContext,
};

use super::{redirect, session_label};

#[derive(Deserialize)]
pub struct AgendaForm {
    pub title: String,
    pub description: Option<String>,
    pub meeting_type: String,
    pub review_doc_required: Option<String>,
    pub proposal_note_required: Option<String>,
    pub presentation_required: Option<String>,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn checkbox(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.is_empty() && s != "false")
}

fn validate_proposal(form: &AgendaForm) -> Result<MeetingType, String> {
    if form.title.trim().len() < 3 {
        return Err("Title must be at least 3 characters".to_string());
    }
    MeetingType::parse(&form.meeting_type).ok_or_else(|| "Unknown meeting type".to_string())
}

/// GET /agendas/new
pub async fn new_form(session: Session) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "agendas")?;
    let tmpl = AgendaFormTemplate {
        ctx,
        agenda: Agenda {
            review_doc_required: true,
            proposal_note_required: true,
            ..Agenda::default()
        },
        is_new: true,
    };
    render(tmpl)
}

/// POST /agendas — submit a meeting proposal.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<AgendaForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user_id = require_user(&session)?;

    let meeting_type = match validate_proposal(&form) {
        Ok(t) => t,
        Err(msg) => {
            set_flash(&session, &msg);
            return Ok(redirect("/agendas/new"));
        }
    };

    let conn = pool.get()?;
    let new = NewAgenda {
        title: form.title.trim().to_string(),
        description: form.description.clone().unwrap_or_default().trim().to_string(),
        meeting_type,
        review_doc_required: checkbox(&form.review_doc_required),
        proposal_note_required: checkbox(&form.proposal_note_required),
        presentation_required: checkbox(&form.presentation_required),
        created_by: user_id,
    };
    let id = agenda::create(&conn, &new)?;

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.created",
        "agenda",
        &id,
        serde_json::json!({
            "title": new.title,
            "meeting_type": meeting_type.as_str(),
        }),
    );

    set_flash(&session, "Agenda proposal submitted");
    Ok(redirect(&format!("/agendas/{}", id)))
}

/// GET /agendas/{id}
pub async fn detail(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "agendas")?;
    let conn = pool.get()?;
    let agenda = agenda::find_by_id(&conn, &path)?.ok_or(AppError::NotFound)?;

    let now = now_unix();
    let signed = |p: &str| {
        if p.is_empty() {
            String::new()
        } else {
            store.signed_url(p, now)
        }
    };

    let attachments = vec![
        AttachmentView {
            field: AttachmentField::ReviewDoc.as_str().to_string(),
            label: "Dokumen Kajian".to_string(),
            path: agenda.review_doc_path.clone(),
            url: signed(&agenda.review_doc_path),
            required: agenda.review_doc_required,
        },
        AttachmentView {
            field: AttachmentField::ProposalNote.as_str().to_string(),
            label: "Nota Usulan".to_string(),
            path: agenda.proposal_note_path.clone(),
            url: signed(&agenda.proposal_note_path),
            required: agenda.proposal_note_required,
        },
        AttachmentView {
            field: AttachmentField::Presentation.as_str().to_string(),
            label: "Materi Presentasi".to_string(),
            path: agenda.presentation_path.clone(),
            url: signed(&agenda.presentation_path),
            required: agenda.presentation_required,
        },
    ];
    let support_docs = agenda
        .support_docs()
        .into_iter()
        .map(|p| AttachmentView {
            field: "support".to_string(),
            label: p.rsplit('/').next().unwrap_or(&p).to_string(),
            url: signed(&p),
            path: p,
            required: false,
        })
        .collect();

    let tmpl = AgendaDetailTemplate {
        status_label: agenda
            .status_enum()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| agenda.status.clone()),
        type_label: agenda
            .meeting_type_enum()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| agenda.meeting_type.clone()),
        session_label: session_label(&agenda),
        minutes_url: match (agenda.meeting_year, agenda.meeting_number) {
            (Some(y), Some(n)) => format!("/meetings/{}/{}/minutes", y, n),
            _ => String::new(),
        },
        attachments,
        support_docs,
        decisions: agenda.decision_items(),
        directives: agenda.directive_items(),
        attendance: agenda.attendance_map().into_iter().collect(),
        guests: agenda.guest_list(),
        monev_summary: stats::monev_summary(&agenda),
        agenda,
        ctx,
    };
    render(tmpl)
}

/// GET /agendas/{id}/edit
pub async fn edit_form(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "agendas")?;
    let conn = pool.get()?;
    let agenda = agenda::find_by_id(&conn, &path)?.ok_or(AppError::NotFound)?;
    let tmpl = AgendaFormTemplate {
        ctx,
        agenda,
        is_new: false,
    };
    render(tmpl)
}

/// POST /agendas/{id} — update proposal fields.
pub async fn update(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<AgendaForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user_id = require_user(&session)?;
    let id = path.into_inner();

    let conn = pool.get()?;
    if agenda::find_by_id(&conn, &id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let meeting_type = match validate_proposal(&form) {
        Ok(t) => t,
        Err(msg) => {
            set_flash(&session, &msg);
            return Ok(redirect(&format!("/agendas/{}/edit", id)));
        }
    };

    agenda::update_proposal(
        &conn,
        &id,
        form.title.trim(),
        form.description.as_deref().unwrap_or_default().trim(),
        meeting_type,
        checkbox(&form.review_doc_required),
        checkbox(&form.proposal_note_required),
        checkbox(&form.presentation_required),
    )?;

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.updated",
        "agenda",
        &id,
        serde_json::json!({"title": form.title.trim()}),
    );

    set_flash(&session, "Agenda updated");
    Ok(redirect(&format!("/agendas/{}", id)))
}

/// POST /agendas/{id}/delete — delete the row and its stored files.
///
/// Row removal happens inside a transaction; file removal runs after commit
/// and is best-effort (a missing object is not an error).
pub async fn delete(
    pool: web::Data<DbPool>,
    store: web::Data<AttachmentStore>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let user_id = require_user(&session)?;
    let id = path.into_inner();

    let mut conn = pool.get()?;
    if agenda::find_by_id(&conn, &id)?.is_none() {
        return Err(AppError::NotFound);
    }

    let paths = agenda::delete(&mut conn, &id)?;
    for p in &paths {
        if let Err(e) = store.remove(p) {
            log::warn!("Failed to remove attachment {}: {}", p, e);
        }
    }

    let _ = crate::audit::log(
        &conn,
        user_id,
        "agenda.deleted",
        "agenda",
        &id,
        serde_json::json!({"removed_files": paths.len()}),
    );

    set_flash(&session, "Agenda deleted");
    Ok(redirect("/agendas"))
}
