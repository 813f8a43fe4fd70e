//! Helpers for Postgres-backed tests.
//!
//! Each [`TestDatabase`] lives in its own freshly created database with all migrations
//! applied, so tests can run in parallel without sharing rows.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::migrations::Migrator;

/// Where the test Postgres server lives.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "buzzify_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "buzzify_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// URL of a named database on the test server.
    #[must_use]
    pub fn url_for(&self, database: &str) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, database
        )
    }
}

/// A throwaway, fully migrated database.
pub struct TestDatabase {
    /// Database connection, shared the way repositories expect it.
    pub conn: Arc<DatabaseConnection>,
    name: String,
    config: TestDbConfig,
}

impl TestDatabase {
    /// Create a uniquely named database and run all migrations on it.
    pub async fn create() -> Result<Self, DbErr> {
        Self::create_with(TestDbConfig::default()).await
    }

    /// Same as [`TestDatabase::create`] against a specific server.
    pub async fn create_with(config: TestDbConfig) -> Result<Self, DbErr> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("buzzify_test_{}", &suffix[..12]);

        let admin = Database::connect(&config.url_for("postgres")).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{name}\""),
            ))
            .await?;
        admin.close().await?;

        let conn = Database::connect(&config.url_for(&name)).await?;
        Migrator::up(&conn, None).await?;

        info!(database = %name, "Created test database");

        Ok(Self {
            conn: Arc::new(conn),
            name,
            config,
        })
    }

    /// Name of the underlying database.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drop the database, terminating any connections still open on it.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        drop(self.conn);

        let admin = Database::connect(&self.config.url_for("postgres")).await?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name),
            ))
            .await?;
        admin.close().await?;

        info!(database = %self.name, "Dropped test database");
        Ok(())
    }
}
