use std::sync::Arc;

use anyhow::Context;
use scanweb_config::Config;
use scanweb_core::{
    database::{
        InMemoryPrincipalResolver, InMemoryScanRepository, PoolSettings,
        PostgresDatabase, PrincipalResolver, ScanRepository,
    },
    model::OwnerId,
    orchestrator::ScanOrchestrator,
    probe::HeuristicProber,
    summary::SummarizerClient,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::app_state::AppState;

/// Store and session backend selected from the configuration.
pub struct StoreBackend {
    pub scans: Arc<dyn ScanRepository>,
    pub principals: Arc<dyn PrincipalResolver>,
    pub postgres: Option<Arc<PostgresDatabase>>,
}

impl std::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreBackend")
            .field("postgres", &self.postgres.is_some())
            .finish_non_exhaustive()
    }
}

impl StoreBackend {
    /// Connect to Postgres and apply migrations.
    pub async fn postgres(
        database_url: &str,
        limits: PoolSettings,
    ) -> anyhow::Result<Self> {
        let pg = PostgresDatabase::new(database_url, limits)
            .await
            .context("failed to connect to PostgreSQL")?;
        pg.initialize_schema()
            .await
            .context("database migration failed")?;
        info!("Successfully connected to PostgreSQL");

        Ok(Self {
            scans: Arc::new(pg.scans()),
            principals: Arc::new(pg.principals()),
            postgres: Some(Arc::new(pg)),
        })
    }

    /// In-memory store with a single development principal. Returns the
    /// bearer token that principal authenticates with.
    pub async fn in_memory() -> (Self, String) {
        let principals = InMemoryPrincipalResolver::new();
        let token = principals.issue(OwnerId(Uuid::new_v4())).await;

        let backend = Self {
            scans: Arc::new(InMemoryScanRepository::new()),
            principals: Arc::new(principals),
            postgres: None,
        };
        (backend, token)
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.database.url.as_deref() {
            Some(url) => {
                Self::postgres(url, config.database.pool_settings()).await
            }
            None => {
                let (backend, token) = Self::in_memory().await;
                warn!("No DATABASE_URL configured; scans are kept in memory");
                info!(token = %token, "development session token issued");
                Ok(backend)
            }
        }
    }
}

/// Wire prober, summarizer and orchestrator around an already selected store.
pub fn build_state(
    config: Arc<Config>,
    backend: StoreBackend,
) -> anyhow::Result<AppState> {
    let prober = HeuristicProber::new(config.scanner.probe_settings())
        .context("failed to build probe client")?;
    let summarizer = SummarizerClient::new(config.summarizer.settings())
        .context("failed to build summarizer client")?;

    let orchestrator = ScanOrchestrator::new(
        Arc::clone(&backend.scans),
        Arc::new(prober),
        Arc::new(summarizer),
        config.scanner.pipeline_config(),
    );

    Ok(AppState {
        config,
        scans: backend.scans,
        principals: backend.principals,
        orchestrator: Arc::new(orchestrator),
        postgres: backend.postgres,
    })
}
