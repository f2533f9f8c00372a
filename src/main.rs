use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use rapat::auth::rate_limit::RateLimiter;
use rapat::storage::AttachmentStore;
use rapat::{audit, auth, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/rapat.db".to_string());
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }

    let pool = db::init_pool(&db_path);
    db::run_migrations(&pool);

    // Seed the admin account and board of directors if the user table is empty
    let admin_hash = auth::password::hash_password(
        &std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
    )
    .expect("Failed to hash default password");
    db::seed_users(&pool, &admin_hash);

    // Clean up old audit entries based on retention policy
    {
        let conn = pool.get().expect("Failed to get connection for audit cleanup");
        audit::cleanup_old_entries(&conn);
    }

    let storage_dir =
        std::env::var("STORAGE_DIR").unwrap_or_else(|_| "data/agenda-attachments".to_string());
    std::fs::create_dir_all(&storage_dir).expect("Failed to create storage directory");
    let signing_key = match std::env::var("STORAGE_SIGNING_KEY") {
        Ok(val) if val.len() >= 32 => val,
        _ => {
            log::warn!("No STORAGE_SIGNING_KEY set — download links break on restart");
            uuid::Uuid::new_v4().to_string()
        }
    };
    let store = AttachmentStore::new(storage_dir, &signing_key);

    // Session encryption key — load from SESSION_KEY env var for persistent sessions across restarts
    let secret_key = match std::env::var("SESSION_KEY") {
        Ok(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Ok(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+) — generating random key", val.len());
            Key::generate()
        }
        Err(_) => {
            log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let rate_limiter = web::Data::new(RateLimiter::default());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{}", bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(rate_limiter.clone())
            // Raw upload bodies go up to the attachment size cap
            .app_data(web::PayloadConfig::new(rapat::storage::MAX_UPLOAD_BYTES))
            // Public routes
            .route("/login", web::get().to(handlers::auth_handlers::login_page))
            .route("/login", web::post().to(handlers::auth_handlers::login_submit))
            .route("/login/verify", web::get().to(handlers::auth_handlers::totp_page))
            .route("/login/verify", web::post().to(handlers::auth_handlers::totp_submit))
            // Signed download URLs carry their own authorization
            .route("/files/{path:.*}", web::get().to(handlers::files::download))
            // Root redirect
            .route("/", web::get().to(|| async {
                actix_web::HttpResponse::SeeOther()
                    .insert_header(("Location", "/dashboard"))
                    .finish()
            }))
            // Protected routes
            .service(
                web::scope("")
                    .wrap(actix_web::middleware::from_fn(auth::middleware::require_auth))
                    .route("/dashboard", web::get().to(handlers::dashboard::index))
                    .route("/logout", web::post().to(handlers::auth_handlers::logout))
                    // Agenda CRUD — /agendas/new BEFORE /agendas/{id} to avoid routing conflict
                    .route("/agendas", web::get().to(handlers::agenda_handlers::list))
                    .route("/agendas/new", web::get().to(handlers::agenda_handlers::new_form))
                    .route("/agendas", web::post().to(handlers::agenda_handlers::create))
                    .route("/agendas/{id}", web::get().to(handlers::agenda_handlers::detail))
                    .route("/agendas/{id}/edit", web::get().to(handlers::agenda_handlers::edit_form))
                    .route("/agendas/{id}", web::post().to(handlers::agenda_handlers::update))
                    .route("/agendas/{id}/delete", web::post().to(handlers::agenda_handlers::delete))
                    // Workflow actions
                    .route("/agendas/{id}/schedule", web::post().to(handlers::agenda_handlers::schedule))
                    .route("/agendas/{id}/cancel", web::post().to(handlers::agenda_handlers::cancel))
                    .route("/agendas/{id}/postpone", web::post().to(handlers::agenda_handlers::postpone))
                    .route("/agendas/{id}/resume", web::post().to(handlers::agenda_handlers::resume))
                    // Attachments
                    .route("/agendas/{id}/attachments/{field}", web::post().to(handlers::agenda_handlers::upload_attachment))
                    .route("/agendas/{id}/attachments/{field}/remove", web::post().to(handlers::agenda_handlers::remove_attachment))
                    .route("/agendas/{id}/support-docs", web::post().to(handlers::agenda_handlers::add_support_doc))
                    .route("/agendas/{id}/support-docs/remove", web::post().to(handlers::agenda_handlers::remove_support_doc))
                    .route("/agendas/{id}/follow-ups/{kind}/{index}/evidence", web::post().to(handlers::agenda_handlers::upload_evidence))
                    // Minutes — one editor per meeting session
                    .route("/meetings/{year}/{number}/minutes", web::get().to(handlers::agenda_handlers::minutes_page))
                    .route("/meetings/{year}/{number}/minutes", web::post().to(handlers::agenda_handlers::minutes_save))
                    // Monev follow-up board
                    .route("/monev", web::get().to(handlers::agenda_handlers::monev_page))
                    .route("/monev/{id}", web::post().to(handlers::agenda_handlers::monev_update))
            )
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
