//! Database module for SQLite persistence.
//!
//! People (with their interests) and images live in separate SQLite
//! databases, mirroring the two stores the application has always used.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::models::UNKNOWN_IMAGE_GUID;

/// Initialize the people database pool and run migrations.
pub async fn init_people_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let pool = open_pool(db_path).await?;
    run_people_migrations(&pool).await?;
    Ok(pool)
}

/// Initialize the image database pool and run migrations.
pub async fn init_image_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let pool = open_pool(db_path).await?;
    run_image_migrations(&pool).await?;
    Ok(pool)
}

async fn open_pool(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Create the person and interest tables.
async fn run_people_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS person (
            person_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            image_guid TEXT NOT NULL DEFAULT '0',
            address_line1 TEXT NOT NULL DEFAULT '',
            address_line2 TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state_or_territory TEXT NOT NULL DEFAULT '',
            zip_code TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interest (
            interest_id INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id INTEGER NOT NULL REFERENCES person(person_id),
            the_interest TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_interest_person ON interest(person_id);
        CREATE INDEX IF NOT EXISTS idx_person_last_name ON person(last_name);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the image table and seed the unknown-image placeholder row so the
/// fallback lookup always resolves.
async fn run_image_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS image (
            id TEXT PRIMARY KEY,
            jpeg BLOB NOT NULL,
            ref_count INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("INSERT OR IGNORE INTO image (id, jpeg, ref_count) VALUES (?, X'', 0)")
        .bind(UNKNOWN_IMAGE_GUID)
        .execute(pool)
        .await?;

    Ok(())
}
