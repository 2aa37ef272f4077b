use std::sync::Arc;

use helpdesk_core::{Config, IntakeQueue, RequesterStore, SanitizedConfig, StalenessSweeper};

/// Shared application state
pub struct AppState {
    config: Config,
    store: Arc<dyn RequesterStore>,
    queue: IntakeQueue,
    sweeper: StalenessSweeper,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn RequesterStore>,
        queue: IntakeQueue,
        sweeper: StalenessSweeper,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            sweeper,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    /// Origin echoed on intake responses.
    pub fn allowed_origin(&self) -> &str {
        &self.config.server.allowed_origin
    }

    pub fn store(&self) -> &dyn RequesterStore {
        self.store.as_ref()
    }

    pub fn queue(&self) -> &IntakeQueue {
        &self.queue
    }

    pub fn sweeper(&self) -> &StalenessSweeper {
        &self.sweeper
    }
}
