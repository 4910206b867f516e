use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

/// A forward-only schema change
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> i64;

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error>;
}

async fn execute_all(conn: &mut SqliteConnection, statements: &[&str]) -> Result<(), sqlx::Error> {
    for statement in statements {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Migration to create users table
struct CreateUsersTable;

#[async_trait]
impl Migration for CreateUsersTable {
    fn name(&self) -> &str {
        "create_users_table"
    }

    fn version(&self) -> i64 {
        20241018_000001
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        execute_all(
            conn,
            &[
                r#"
                CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL,
                    email TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'active'
                        CHECK (status IN ('active', 'passive', 'banned')),
                    last_login TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
                "CREATE UNIQUE INDEX idx_users_username ON users (username)",
                "CREATE UNIQUE INDEX idx_users_email ON users (email)",
            ],
        )
        .await
    }
}

/// Migration to create admins table
struct CreateAdminsTable;

#[async_trait]
impl Migration for CreateAdminsTable {
    fn name(&self) -> &str {
        "create_admins_table"
    }

    fn version(&self) -> i64 {
        20241018_000002
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        execute_all(
            conn,
            &[
                r#"
                CREATE TABLE admins (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT NOT NULL,
                    name TEXT NOT NULL,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL
                        CHECK (role IN ('super_admin', 'admin', 'editor')),
                    status TEXT NOT NULL DEFAULT 'active'
                        CHECK (status IN ('active', 'passive')),
                    last_login TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    deleted_at TEXT
                )
                "#,
                // Soft-deleted rows release their email
                "CREATE UNIQUE INDEX idx_admins_email_live ON admins (email) WHERE deleted_at IS NULL",
                "CREATE INDEX idx_admins_role_created ON admins (role, created_at)",
            ],
        )
        .await
    }
}

fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![Box::new(CreateUsersTable), Box::new(CreateAdminsTable)]
}

/// Apply pending migrations in version order.
///
/// Returns the number of migrations applied; already-applied versions are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_migrations")
        .fetch_all(pool)
        .await?;

    let mut migrations = all_migrations();
    migrations.sort_by_key(|m| m.version());

    let mut count = 0;
    for migration in migrations.iter().filter(|m| !applied.contains(&m.version())) {
        tracing::info!(name = migration.name(), version = migration.version(), "running migration");

        let mut tx = pool.begin().await?;
        migration.up(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version())
            .bind(migration.name())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();

        assert_eq!(run_migrations(&pool).await.unwrap(), 2);
        assert_eq!(run_migrations(&pool).await.unwrap(), 0);

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'admins') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(tables, vec!["admins".to_string(), "users".to_string()]);
    }
}
