use std::{fmt, sync::Arc};

use scanweb_config::{Config, SubmitMode};
use scanweb_core::{
    database::{PostgresDatabase, PrincipalResolver, ScanRepository},
    orchestrator::ScanOrchestrator,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scans: Arc<dyn ScanRepository>,
    pub principals: Arc<dyn PrincipalResolver>,
    pub orchestrator: Arc<ScanOrchestrator>,
    /// Set when the store is Postgres; used for pool diagnostics.
    pub postgres: Option<Arc<PostgresDatabase>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_handle(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    pub fn scans(&self) -> &Arc<dyn ScanRepository> {
        &self.scans
    }

    pub fn principals(&self) -> &Arc<dyn PrincipalResolver> {
        &self.principals
    }

    pub fn orchestrator(&self) -> &Arc<ScanOrchestrator> {
        &self.orchestrator
    }

    pub fn submit_mode(&self) -> SubmitMode {
        self.config.scanner.submit_mode
    }
}
