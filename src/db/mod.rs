//! Database module for SQLite persistence.
//!
//! The pool is the only shared mutable resource in the service. Each
//! repository operation checks out one transaction for its lifetime and
//! gives it back on commit. An uncommitted `sqlx::Transaction` rolls back
//! when dropped, which covers both the error path and a request future
//! that is cancelled mid-flight.

mod repository;
mod store;

pub use repository::*;
pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Create the five team tables if they don't exist.
///
/// Languages hang off the team (not the project row) so that replacing a
/// project and deleting a team address them the same way.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            leader TEXT NOT NULL,
            team_name TEXT NOT NULL UNIQUE,
            open_roles INTEGER NOT NULL DEFAULT 0,
            size INTEGER NOT NULL DEFAULT 0,
            last_active TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            member_email TEXT NOT NULL DEFAULT '',
            member_role TEXT NOT NULL DEFAULT '',
            team_id INTEGER NOT NULL REFERENCES teams(id),
            UNIQUE (team_id, user_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            skill_name TEXT NOT NULL,
            team_id INTEGER NOT NULL REFERENCES teams(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal TEXT NOT NULL DEFAULT '',
            project_name TEXT NOT NULL,
            github_link TEXT NOT NULL DEFAULT '',
            complexity INTEGER NOT NULL DEFAULT 0,
            duration INTEGER NOT NULL DEFAULT 0,
            team_id INTEGER NOT NULL UNIQUE REFERENCES teams(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS languages (
            lang_name TEXT NOT NULL,
            team_id INTEGER NOT NULL REFERENCES teams(id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_teams_leader ON teams(leader);
        CREATE INDEX IF NOT EXISTS idx_members_user_id ON members(user_id);
        CREATE INDEX IF NOT EXISTS idx_members_role ON members(member_role);
        CREATE INDEX IF NOT EXISTS idx_skills_team_id ON skills(team_id);
        CREATE INDEX IF NOT EXISTS idx_skills_name ON skills(skill_name);
        CREATE INDEX IF NOT EXISTS idx_projects_complexity ON projects(complexity);
        CREATE INDEX IF NOT EXISTS idx_languages_team_id ON languages(team_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
