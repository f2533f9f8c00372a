use askama::Template;

use crate::models::stats::DashboardStats;
use super::PageContext;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub from: String,
    pub to: String,
    pub stats: DashboardStats,
}
