//! Authentication tests — password hashing, user lookup, the director
//! roster, login logging, database seeding and login rate limiting.

mod common;

use std::net::{IpAddr, Ipv4Addr};

use rapat::auth::password::{hash_password, verify_password};
use rapat::auth::rate_limit::RateLimiter;
use rapat::auth::totp;
use rapat::db;
use rapat::models::login_log::{self, LoginOutcome};
use rapat::models::user;
use common::*;

#[test]
fn test_password_hash_and_verify() {
    let hash = hash_password("rahasia-negara").expect("Failed to hash");
    assert!(hash.starts_with("$argon2"));
    assert_eq!(verify_password("rahasia-negara", &hash), Ok(true));
    assert_eq!(verify_password("salah", &hash), Ok(false));
}

#[test]
fn test_find_by_username_matches_email_too() {
    let (_dir, conn) = setup_test_db();
    let id = seed_user(&conn, "dirut", "DIREKTUR");

    let by_name = user::find_by_username(&conn, "dirut").unwrap().expect("Not found");
    assert_eq!(by_name.id, id);

    let by_email = user::find_by_username(&conn, "dirut@example.com").unwrap().expect("Not found");
    assert_eq!(by_email.id, id);

    assert!(user::find_by_username(&conn, "nobody").unwrap().is_none());
}

#[test]
fn test_list_directors_ordered_by_name() {
    let (_dir, conn) = setup_test_db();
    seed_user(&conn, "zulkifli", "DIREKTUR");
    seed_user(&conn, "admin", "ADMIN");
    seed_user(&conn, "andi", "DIREKTUR");

    let directors = user::list_directors(&conn).expect("Query failed");
    let names: Vec<&str> = directors.iter().map(|u| u.full_name.as_str()).collect();
    assert_eq!(names, vec!["andi", "zulkifli"]);
}

#[test]
fn test_totp_secret_roundtrip() {
    let (_dir, conn) = setup_test_db();
    let id = seed_user(&conn, "dirut", "DIREKTUR");

    let secret = totp::generate_secret();
    assert_eq!(secret.len(), 40);

    user::set_totp_secret(&conn, id, Some(&secret)).expect("Failed to set secret");
    let u = user::find_by_id(&conn, id).unwrap().unwrap();
    assert_eq!(u.totp_secret.as_deref(), Some(secret.as_str()));

    user::set_totp_secret(&conn, id, None).expect("Failed to clear secret");
    let u = user::find_by_id(&conn, id).unwrap().unwrap();
    assert!(u.totp_secret.is_none());
}

#[test]
fn test_login_log_records_outcomes() {
    let (_dir, conn) = setup_test_db();
    let id = seed_user(&conn, "dirut", "DIREKTUR");

    login_log::record(&conn, None, "ghost", "10.0.0.1", LoginOutcome::UnknownUser)
        .expect("Failed to record");
    login_log::record(&conn, Some(id), "dirut", "10.0.0.2", LoginOutcome::Success)
        .expect("Failed to record");

    let recent = login_log::find_recent(&conn, 10).expect("Query failed");
    assert_eq!(recent.len(), 2);
    // newest first
    assert_eq!(recent[0].outcome, "SUCCESS");
    assert_eq!(recent[0].user_id, Some(id));
    assert_eq!(recent[1].outcome, "UNKNOWN_USER");
    assert_eq!(recent[1].user_id, None);
}

#[test]
fn test_seed_users_is_idempotent() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let pool = db::init_pool(dir.path().join("seed.db").to_str().unwrap());
    db::run_migrations(&pool);

    db::seed_users(&pool, "hash");
    db::seed_users(&pool, "hash");

    let conn = pool.get().unwrap();
    // one admin plus four directors, seeded exactly once
    assert_eq!(user::count(&conn).unwrap(), 5);
    assert_eq!(user::list_directors(&conn).unwrap().len(), 4);
}

#[test]
fn test_rate_limiter_blocks_after_max_attempts() {
    let limiter = RateLimiter::default();
    let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9));
    let other = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 10));

    for _ in 0..4 {
        limiter.record_failure(ip);
    }
    assert!(!limiter.is_blocked(ip));

    limiter.record_failure(ip);
    assert!(limiter.is_blocked(ip));
    // other addresses are unaffected
    assert!(!limiter.is_blocked(other));

    limiter.clear(ip);
    assert!(!limiter.is_blocked(ip));
}
