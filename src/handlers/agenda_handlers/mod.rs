mod attachments;
mod crud;
mod list;
mod minutes;
mod monev;
mod schedule;

pub use attachments::*;
pub use crud::*;
pub use list::*;
pub use minutes::*;
pub use monev::*;
pub use schedule::*;

use actix_web::HttpResponse;

use crate::models::agenda::Agenda;

/// "No. <number>/<year>" when the agenda has been assigned to a session.
pub(crate) fn session_label(agenda: &Agenda) -> String {
    match (agenda.meeting_number, agenda.meeting_year) {
        (Some(n), Some(y)) => format!("No. {}/{}", n, y),
        _ => String::new(),
    }
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.to_string()))
        .finish()
}
