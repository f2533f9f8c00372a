use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::errors::AppError;
use crate::handlers::now_unix;
use crate::storage::{AttachmentStore, content_type_for};

#[derive(Deserialize)]
pub struct SignedQuery {
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub sig: String,
}

/// GET /files/{path} — serve a stored attachment. Only requests carrying a
/// valid, unexpired signature are honored; everything else is a 404 so the
/// endpoint does not leak which paths exist.
pub async fn download(
    store: web::Data<AttachmentStore>,
    path: web::Path<String>,
    query: web::Query<SignedQuery>,
) -> Result<HttpResponse, AppError> {
    let rel_path = path.into_inner();
    if !store.verify(&rel_path, query.exp, &query.sig, now_unix()) {
        return Err(AppError::NotFound);
    }

    let bytes = store.read(&rel_path)?;
    let filename = rel_path.rsplit('/').next().unwrap_or("download");
    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&rel_path))
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}
