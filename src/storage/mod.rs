//! Disk-backed attachment bucket.
//!
//! Stored objects follow the `<prefix>/<owner>/<uuid>-<field>.<ext>` naming
//! convention, with one prefix per meeting type plus `evidence/` for monev
//! evidence uploads. Downloads go through time-limited signed URLs only.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Signed URLs expire after one hour.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "png", "jpg", "jpeg",
];

pub const EVIDENCE_PREFIX: &str = "evidence";

#[derive(Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    signing_key: Vec<u8>,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, signing_key: &str) -> Self {
        Self {
            root: root.into(),
            signing_key: signing_key.as_bytes().to_vec(),
        }
    }

    /// Store an upload and return its bucket-relative path.
    ///
    /// `prefix` is the meeting-type (or evidence) directory, `owner` scopes
    /// the object to an agenda or user, `field` names the slot the file fills.
    pub fn store(
        &self,
        prefix: &str,
        owner: &str,
        field: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Empty upload".to_string()));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "Upload exceeds {} MB limit",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        let ext = extension_of(filename)?;

        let rel_path = format!("{}/{}/{}-{}.{}", prefix, owner, Uuid::new_v4(), field, ext);
        let abs = self.root.join(&rel_path);
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("create dir: {e}")))?;
        }
        std::fs::write(&abs, bytes).map_err(|e| AppError::Storage(format!("write: {e}")))?;
        Ok(rel_path)
    }

    /// Remove an object. Missing files are not an error: delete flows retry
    /// after partial failures and removal must stay idempotent.
    pub fn remove(&self, rel_path: &str) -> Result<(), AppError> {
        if !is_safe_path(rel_path) {
            return Err(AppError::Storage(format!("unsafe path: {rel_path}")));
        }
        match std::fs::remove_file(self.root.join(rel_path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("remove: {e}"))),
        }
    }

    pub fn read(&self, rel_path: &str) -> Result<Vec<u8>, AppError> {
        if !is_safe_path(rel_path) {
            return Err(AppError::Storage(format!("unsafe path: {rel_path}")));
        }
        std::fs::read(self.root.join(rel_path)).map_err(|_| AppError::NotFound)
    }

    pub fn exists(&self, rel_path: &str) -> bool {
        is_safe_path(rel_path) && self.root.join(rel_path).is_file()
    }

    /// Build a signed download URL valid for one hour from `now_unix`.
    pub fn signed_url(&self, rel_path: &str, now_unix: u64) -> String {
        let exp = now_unix + SIGNED_URL_TTL_SECS;
        let sig = self.sign(rel_path, exp);
        format!("/files/{}?exp={}&sig={}", rel_path, exp, sig)
    }

    /// Verify an `exp`/`sig` pair for a path. Rejects expired or tampered
    /// signatures and traversal attempts.
    pub fn verify(&self, rel_path: &str, exp: u64, sig: &str, now_unix: u64) -> bool {
        if !is_safe_path(rel_path) || now_unix > exp {
            return false;
        }
        constant_time_eq(&self.sign(rel_path, exp), sig)
    }

    fn sign(&self, rel_path: &str, exp: u64) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .expect("HMAC accepts any key length");
        mac.update(rel_path.as_bytes());
        mac.update(b"|");
        mac.update(exp.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

fn extension_of(filename: &str) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "File type '.{ext}' is not allowed"
        )))
    }
}

fn is_safe_path(rel_path: &str) -> bool {
    !rel_path.is_empty()
        && !rel_path.starts_with('/')
        && !rel_path.contains('\\')
        && !rel_path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Content type for serving a stored object, keyed on its extension.
pub fn content_type_for(rel_path: &str) -> &'static str {
    let ext = Path::new(rel_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}
