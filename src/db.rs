use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the admin account and the director roster if the users table is empty.
///
/// Directors are ordinary users with role DIREKTUR; the dashboard attendance
/// recap is keyed by their full names. Idempotent: skipped when any user exists.
pub fn seed_users(pool: &DbPool, admin_password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already seeded ({} users), skipping seed", count);
        return;
    }

    conn.execute(
        "INSERT INTO users (email, username, full_name, password_hash, role) \
         VALUES ('admin@example.com', 'admin', 'Administrator', ?1, 'ADMIN')",
        params![admin_password_hash],
    )
    .expect("Failed to seed admin user");

    let directors = [
        ("dirut@example.com", "dirut", "Direktur Utama"),
        ("dirkeu@example.com", "dirkeu", "Direktur Keuangan"),
        ("dirops@example.com", "dirops", "Direktur Operasi"),
        ("dirsdm@example.com", "dirsdm", "Direktur SDM"),
    ];
    for (email, username, full_name) in directors {
        conn.execute(
            "INSERT INTO users (email, username, full_name, password_hash, role) \
             VALUES (?1, ?2, ?3, ?4, 'DIREKTUR')",
            params![email, username, full_name, admin_password_hash],
        )
        .expect("Failed to seed director");
    }

    log::info!("Seeded admin user and {} directors", directors.len());
}
