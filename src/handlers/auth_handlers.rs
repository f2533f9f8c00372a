use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::auth::{csrf, password, rate_limit::RateLimiter, session, totp};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::login_log::{self, LoginOutcome};
use crate::models::user;
use crate::templates_structs::{APP_NAME, LoginTemplate, TotpTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct TotpForm {
    pub code: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn peer_ip(req: &HttpRequest) -> std::net::IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED))
}

fn login_error(session: &Session, message: &str) -> Result<HttpResponse, AppError> {
    let tmpl = LoginTemplate {
        error: message.to_string(),
        app_name: APP_NAME,
        csrf_token: csrf::get_or_create_token(session),
    };
    render(tmpl)
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    // Authenticated users have no business on the login page
    if session::get_user_id(&session).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    login_error(&session, "")
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let ip = peer_ip(&req);
    let conn = pool.get()?;

    if limiter.is_blocked(ip) {
        let _ = login_log::record(
            &conn,
            None,
            &form.username,
            &ip.to_string(),
            LoginOutcome::RateLimited,
        );
        return login_error(
            &session,
            "Too many failed login attempts. Please try again later.",
        );
    }

    let found = user::find_by_username(&conn, &form.username)?;
    let Some(u) = found else {
        limiter.record_failure(ip);
        let _ = login_log::record(
            &conn,
            None,
            &form.username,
            &ip.to_string(),
            LoginOutcome::UnknownUser,
        );
        return login_error(&session, "Invalid username or password");
    };

    match password::verify_password(&form.password, &u.password_hash) {
        Ok(true) => {}
        _ => {
            limiter.record_failure(ip);
            let _ = login_log::record(
                &conn,
                Some(u.id),
                &u.username,
                &ip.to_string(),
                LoginOutcome::BadPassword,
            );
            return login_error(&session, "Invalid username or password");
        }
    }

    limiter.clear(ip);

    // Accounts with a TOTP secret get a second step before the session is
    // established.
    if u.totp_secret.is_some() {
        session::set_pending_2fa(&session, u.id);
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/login/verify"))
            .finish());
    }

    session::establish(&session, u.id, &u.username, &u.role);
    let _ = login_log::record(
        &conn,
        Some(u.id),
        &u.username,
        &ip.to_string(),
        LoginOutcome::Success,
    );
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/dashboard"))
        .finish())
}

pub async fn totp_page(session: Session) -> Result<HttpResponse, AppError> {
    if session::pending_2fa(&session).is_none() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish());
    }
    let tmpl = TotpTemplate {
        error: String::new(),
        app_name: APP_NAME,
        csrf_token: csrf::get_or_create_token(&session),
    };
    render(tmpl)
}

pub async fn totp_submit(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<TotpForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(user_id) = session::pending_2fa(&session) else {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/login"))
            .finish());
    };

    let ip = peer_ip(&req);
    let conn = pool.get()?;
    let u = user::find_by_id(&conn, user_id)?.ok_or(AppError::NotFound)?;

    let secret = u.totp_secret.as_deref().unwrap_or_default();
    if !totp::verify(secret, form.code.trim()) {
        let _ = login_log::record(
            &conn,
            Some(u.id),
            &u.username,
            &ip.to_string(),
            LoginOutcome::BadTotp,
        );
        let tmpl = TotpTemplate {
            error: "Invalid verification code".to_string(),
            app_name: APP_NAME,
            csrf_token: csrf::get_or_create_token(&session),
        };
        return render(tmpl);
    }

    session::establish(&session, u.id, &u.username, &u.role);
    let _ = login_log::record(
        &conn,
        Some(u.id),
        &u.username,
        &ip.to_string(),
        LoginOutcome::Success,
    );
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/dashboard"))
        .finish())
}

pub async fn logout(
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
