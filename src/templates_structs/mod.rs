// Template context structures for Askama templates, organized by domain.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{get_role, get_username, take_flash};
use crate::errors::AppError;

pub const APP_NAME: &str = "Board Meeting";

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.flash`, etc.
/// `flash` is empty when there is no pending message.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub role: String,
    pub flash: String,
    pub app_name: &'static str,
    pub csrf_token: String,
    pub active: String,
}

impl PageContext {
    pub fn build(session: &Session, active: &str) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {}", e)))?;
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Ok(Self {
            username,
            avatar_initial,
            role: get_role(session),
            flash: take_flash(session).unwrap_or_default(),
            app_name: APP_NAME,
            csrf_token: csrf::get_or_create_token(session),
            active: active.to_string(),
        })
    }
}

mod agenda;
mod common;
mod dashboard;

pub use self::agenda::{
    AgendaDetailTemplate, AgendaFormTemplate, AgendaListTemplate, AgendaRowView, AttachmentView,
    MinutesAgendaView, MinutesTemplate, MonevEntryView, MonevItemView, MonevTemplate,
};
pub use self::common::{LoginTemplate, TotpTemplate};
pub use self::dashboard::DashboardTemplate;
