//! Migration runner for the push subscription table.
//!
//! Usage:
//!   cargo run -p notify-api --bin notify-migrate
//!   cargo run -p notify-api --bin notify-migrate -- --test     # <db>_test
//!   cargo run -p notify-api --bin notify-migrate -- --revert   # undo last
//!
//! Reads DATABASE_URL from the environment (or .env via dotenvy).

use std::error::Error;
use std::path::Path;

use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use notify_api::db::test_database_url;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL env var is required")?;
    if args.iter().any(|a| a == "--test") {
        database_url = test_database_url(&database_url);
    }

    let mut conn = PgConnection::establish(&database_url)?;

    if args.iter().any(|a| a == "--revert") {
        let reverted = conn.revert_last_migration(MIGRATIONS)?;
        println!("Reverted: {reverted}");
        return Ok(());
    }

    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if applied.is_empty() {
        println!("Database is up to date.");
    }
    for migration in &applied {
        println!("Applied: {migration}");
    }
    Ok(())
}
