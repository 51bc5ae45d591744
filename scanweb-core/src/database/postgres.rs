use std::{fmt, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use tracing::info;

use crate::{
    database::repositories::{
        principals::PostgresPrincipalResolver, scans::PostgresScanRepository,
    },
    error::{Result, ScanError},
};

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
    pub min_idle: u32,
}

/// Connection pool bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
        }
    }
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
    min_connections: u32,
    scans: PostgresScanRepository,
    principals: PostgresPrincipalResolver,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(
        connection_string: &str,
        limits: PoolSettings,
    ) -> Result<Self> {
        let PoolSettings {
            max_connections,
            min_connections,
        } = limits;

        let connect_options = Self::build_connect_options(connection_string)?;
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                ScanError::Persistence(format!(
                    "Database connection failed: {}",
                    e
                ))
            })?;

        info!(
            "Database pool initialized with max_connections={}, min_connections={}",
            max_connections, min_connections
        );

        Ok(Self::with_limits(pool, max_connections, min_connections))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let limits = PoolSettings::default();
        Self::with_limits(pool, limits.max_connections, limits.min_connections)
    }

    fn with_limits(
        pool: PgPool,
        max_connections: u32,
        min_connections: u32,
    ) -> Self {
        let scans = PostgresScanRepository::new(pool.clone());
        let principals = PostgresPrincipalResolver::new(pool.clone());
        Self {
            pool,
            max_connections,
            min_connections,
            scans,
            principals,
        }
    }

    fn build_connect_options(
        connection_string: &str,
    ) -> Result<PgConnectOptions> {
        let trimmed = connection_string.trim();
        if trimmed.is_empty() {
            return Ok(PgConnectOptions::new());
        }
        trimmed.parse::<PgConnectOptions>().map_err(|e| {
            ScanError::Persistence(format!(
                "Invalid PostgreSQL connection string: {}",
                e
            ))
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn scans(&self) -> PostgresScanRepository {
        self.scans.clone()
    }

    pub fn principals(&self) -> PostgresPrincipalResolver {
        self.principals.clone()
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
            min_idle: self.min_connections,
        }
    }

    /// Run only the preflight checks without applying migrations.
    pub async fn preflight_only(&self) -> Result<()> {
        self.preflight_check().await
    }

    /// Surfaces a missing CREATE privilege as an actionable error instead of
    /// a generic failure halfway through the migrations.
    async fn preflight_check(&self) -> Result<()> {
        let (current_user, can_create): (String, bool) = sqlx::query_as(
            "SELECT current_user::text, has_schema_privilege(current_user, 'public', 'CREATE')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Privilege preflight failed: {}", e))
        })?;

        if !can_create {
            return Err(ScanError::Persistence(format!(
                "Database preflight failed: role '{current_user}' lacks CREATE on schema public.\n\
                 Run as a superuser or the database owner:\n  \
                 GRANT USAGE, CREATE ON SCHEMA public TO {current_user};"
            )));
        }

        Ok(())
    }

    pub async fn initialize_schema(&self) -> Result<()> {
        self.preflight_check().await?;

        crate::MIGRATOR.run(&self.pool).await.map_err(|e| {
            ScanError::Persistence(format!("Migration failed: {}", e))
        })?;

        Ok(())
    }
}
