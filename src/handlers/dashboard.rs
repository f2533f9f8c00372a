use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Duration, Local, NaiveDate, Timelike};
use serde::Deserialize;

use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::stats;
use crate::templates_structs::{DashboardTemplate, PageContext};

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn time_greeting(username: &str) -> String {
    let hour = Local::now().hour();
    let period = match hour {
        5..=10 => "Selamat pagi",
        11..=14 => "Selamat siang",
        15..=18 => "Selamat sore",
        _ => "Selamat malam",
    };
    format!("{}, {}", period, username)
}

/// Dashboard with date-filtered statistics. Defaults to the last 30 days;
/// unparseable dates fall back to the default bound rather than erroring.
pub async fn index(
    pool: web::Data<DbPool>,
    session: Session,
    query: web::Query<RangeQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, "dashboard")?;

    let today = Local::now().date_naive();
    let to = parse_date_or(query.to.as_deref(), today);
    let from = parse_date_or(query.from.as_deref(), today - Duration::days(29));

    let conn = pool.get()?;
    let stats = stats::compute(&conn, from, to)?;

    let greeting = time_greeting(&ctx.username);
    let tmpl = DashboardTemplate {
        ctx,
        greeting,
        from: from.format("%Y-%m-%d").to_string(),
        to: to.format("%Y-%m-%d").to_string(),
        stats,
    };
    render(tmpl)
}

fn parse_date_or(raw: Option<&str>, fallback: NaiveDate) -> NaiveDate {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
        .unwrap_or(fallback)
}
