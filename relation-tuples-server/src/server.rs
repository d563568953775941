use relation_tuples::{InMemoryRelationTupleManager, ReadService, RelationTupleManager};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::writer::{JsonResponseWriter, ResponseWriter};

/// Shared handler state; every dependency is handed in by the caller
#[derive(Clone)]
pub struct RelationTupleServer {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    read: Arc<ReadService>,
    writer: Arc<dyn ResponseWriter>,
    started_at: Instant,
}

impl RelationTupleServer {
    pub fn new(
        config: ServerConfig,
        manager: Arc<dyn RelationTupleManager>,
        writer: Arc<dyn ResponseWriter>,
    ) -> Self {
        let read = ReadService::new(manager).with_options(config.read.into());
        Self {
            config: Arc::new(config),
            read: Arc::new(read),
            writer,
            started_at: Instant::now(),
        }
    }

    /// Wire up the in-memory store, seeded from `seed.file` when configured,
    /// and the JSON writer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the seed file cannot be loaded.
    pub fn from_config(config: ServerConfig) -> ApiResult<Self> {
        let manager = match &config.seed.file {
            Some(path) => {
                let manager = InMemoryRelationTupleManager::from_seed_file(path)
                    .map_err(|e| ApiError::configuration(e.to_string()))?;
                info!(path = %path.display(), tuples = manager.len(), "Loaded seed tuples");
                manager
            }
            None => InMemoryRelationTupleManager::new(),
        };

        Ok(Self::new(config, Arc::new(manager), Arc::new(JsonResponseWriter)))
    }

    pub fn read(&self) -> &ReadService {
        &self.read
    }

    pub fn read_service(&self) -> Arc<ReadService> {
        Arc::clone(&self.read)
    }

    pub fn writer(&self) -> &dyn ResponseWriter {
        self.writer.as_ref()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
