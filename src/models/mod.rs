pub mod agenda;
pub mod login_log;
pub mod stats;
pub mod user;
