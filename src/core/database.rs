// src/core/database.rs
//! SQLite connection management and versioned schema migrations

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::core::FsOps;

/// Schema version the current build writes and expects.
pub const SCHEMA_VERSION: i64 = 2;

/// How long a writer waits for SQLite's write lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

struct Migration {
    version: i64,
    description: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create interview_experiences",
        statements: &[
            r#"
            CREATE TABLE IF NOT EXISTS interview_experiences (
                id INTEGER PRIMARY KEY,
                company TEXT NOT NULL,
                position TEXT NOT NULL,
                experience TEXT NOT NULL,
                date TEXT NOT NULL,
                comments INTEGER NOT NULL DEFAULT 0
            );
            "#,
            "CREATE INDEX IF NOT EXISTS idx_experiences_company ON interview_experiences(company);",
        ],
    },
    Migration {
        version: 2,
        description: "add decomposed experience sections",
        statements: &[
            "ALTER TABLE interview_experiences ADD COLUMN interview_rounds TEXT;",
            "ALTER TABLE interview_experiences ADD COLUMN technical_questions TEXT;",
            "ALTER TABLE interview_experiences ADD COLUMN system_design TEXT;",
            "ALTER TABLE interview_experiences ADD COLUMN behavioral_questions TEXT;",
            "ALTER TABLE interview_experiences ADD COLUMN overall_experience TEXT;",
        ],
    },
];

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create new database connection and bring the schema up to date
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                FsOps::ensure_dir_exists(parent).await?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let options = SqliteConnectOptions::from_str(&database_url)
            .with_context(|| format!("Invalid database path: {}", database_path.display()))?
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePool::connect_with(options).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every migration newer than the recorded schema version
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create schema_migrations table")?;

        let current = self.schema_version().await?;

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let mut tx = self.pool.begin().await?;

            for statement in migration.statements {
                sqlx::query(statement)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| {
                        format!(
                            "Migration v{} ({}) failed",
                            migration.version, migration.description
                        )
                    })?;
            }

            sqlx::query("INSERT INTO schema_migrations (version, description) VALUES (?, ?)")
                .bind(migration.version)
                .bind(migration.description)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;
            info!(
                "Applied migration v{}: {}",
                migration.version, migration.description
            );
        }

        info!("Database schema at version {}", SCHEMA_VERSION);
        Ok(())
    }

    /// Highest applied migration, 0 on a fresh database
    pub async fn schema_version(&self) -> Result<i64> {
        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await
                .context("Failed to read schema version")?;
        Ok(version)
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fresh_database_reaches_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(&dir.path().join("hub.db")).await.unwrap();

        assert_eq!(db.schema_version().await.unwrap(), SCHEMA_VERSION);
        db.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.db");

        let db = Database::new(&path).await.unwrap();
        db.migrate().await.unwrap();
        drop(db);

        let reopened = Database::new(&path).await.unwrap();
        let applied: Vec<i64> =
            sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
                .fetch_all(reopened.pool())
                .await
                .unwrap();
        assert_eq!(applied, vec![1, 2]);
    }
}
