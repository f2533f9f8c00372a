//! Attachment store tests — naming convention, extension whitelist, signed
//! URL verification and path traversal rejection.

use tempfile::TempDir;

use rapat::storage::{AttachmentStore, SIGNED_URL_TTL_SECS, content_type_for};

fn setup_store() -> (TempDir, AttachmentStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = AttachmentStore::new(dir.path(), "test-signing-key-0123456789abcdef");
    (dir, store)
}

#[test]
fn test_store_follows_naming_convention() {
    let (dir, store) = setup_store();
    let path = store
        .store("radir", "agenda-1", "review-doc", "Kajian Final.PDF", b"%PDF-1.4")
        .expect("Failed to store");

    assert!(path.starts_with("radir/agenda-1/"));
    assert!(path.ends_with("-review-doc.pdf"));
    assert!(dir.path().join(&path).is_file());
    assert!(store.exists(&path));
    assert_eq!(store.read(&path).expect("Failed to read"), b"%PDF-1.4");
}

#[test]
fn test_store_rejects_disallowed_extension() {
    let (_dir, store) = setup_store();
    assert!(store.store("radir", "a", "review-doc", "payload.exe", b"MZ").is_err());
    assert!(store.store("radir", "a", "review-doc", "noextension", b"x").is_err());
    assert!(store.store("radir", "a", "review-doc", "empty.pdf", b"").is_err());
}

#[test]
fn test_remove_is_idempotent() {
    let (_dir, store) = setup_store();
    let path = store
        .store("evidence", "agenda-1", "decision-0", "bukti.png", b"\x89PNG")
        .expect("Failed to store");

    store.remove(&path).expect("Failed to remove");
    assert!(!store.exists(&path));
    // second removal of the same path is still Ok
    store.remove(&path).expect("Repeat removal failed");
}

#[test]
fn test_signed_url_verifies_until_expiry() {
    let (_dir, store) = setup_store();
    let now = 1_756_000_000u64;
    let url = store.signed_url("radir/a/file.pdf", now);
    assert!(url.starts_with("/files/radir/a/file.pdf?exp="));

    let exp = now + SIGNED_URL_TTL_SECS;
    let sig = url.rsplit("sig=").next().unwrap().to_string();

    assert!(store.verify("radir/a/file.pdf", exp, &sig, now));
    assert!(store.verify("radir/a/file.pdf", exp, &sig, exp));
    // one second past expiry
    assert!(!store.verify("radir/a/file.pdf", exp, &sig, exp + 1));
}

#[test]
fn test_tampered_signature_rejected() {
    let (_dir, store) = setup_store();
    let now = 1_756_000_000u64;
    let url = store.signed_url("radir/a/file.pdf", now);
    let exp = now + SIGNED_URL_TTL_SECS;
    let sig = url.rsplit("sig=").next().unwrap().to_string();

    // signature bound to a different path
    assert!(!store.verify("radir/a/other.pdf", exp, &sig, now));
    // signature bound to a different expiry
    assert!(!store.verify("radir/a/file.pdf", exp + 1, &sig, now));
    // mangled signature
    assert!(!store.verify("radir/a/file.pdf", exp, "deadbeef", now));
}

#[test]
fn test_keys_produce_distinct_signatures() {
    let dir = TempDir::new().unwrap();
    let store_a = AttachmentStore::new(dir.path(), "key-a-0123456789abcdef0123456789");
    let store_b = AttachmentStore::new(dir.path(), "key-b-0123456789abcdef0123456789");

    let now = 1_756_000_000u64;
    let url = store_a.signed_url("radir/a/file.pdf", now);
    let sig = url.rsplit("sig=").next().unwrap().to_string();
    assert!(!store_b.verify("radir/a/file.pdf", now + SIGNED_URL_TTL_SECS, &sig, now));
}

#[test]
fn test_traversal_paths_rejected() {
    let (_dir, store) = setup_store();
    let now = 1_756_000_000u64;
    for bad in ["../etc/passwd", "radir/../../x", "/abs/path.pdf", "radir//x.pdf", "a\\b.pdf", ""] {
        let url = store.signed_url(bad, now);
        let sig = url.rsplit("sig=").next().unwrap().to_string();
        // even a correctly signed traversal path must not verify
        assert!(!store.verify(bad, now + SIGNED_URL_TTL_SECS, &sig, now), "{bad}");
        assert!(store.read(bad).is_err());
    }
}

#[test]
fn test_content_types() {
    assert_eq!(content_type_for("a/b/c.pdf"), "application/pdf");
    assert_eq!(content_type_for("a/b/c.PNG"), "image/png");
    assert_eq!(
        content_type_for("a/b/c.docx"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert_eq!(content_type_for("a/b/unknown"), "application/octet-stream");
}
