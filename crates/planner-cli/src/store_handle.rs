//! Opening the store a command runs against.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use planner_core::seed::seed_starter_data;
use planner_core::store::{MemoryStore, PgStore, Store};
use planner_db::pool;

use crate::config::PlannerConfig;

/// A store plus the pool behind it, if any, so it can be closed cleanly.
pub struct StoreHandle {
    pub store: Arc<dyn Store>,
    pool: Option<PgPool>,
}

impl StoreHandle {
    /// Connect to PostgreSQL using the resolved config.
    pub async fn connect(config: &PlannerConfig) -> Result<Self> {
        let pool = pool::create_pool(&config.db_config).await?;
        Ok(Self {
            store: Arc::new(PgStore::new(pool.clone())),
            pool: Some(pool),
        })
    }

    /// A throwaway in-memory store loaded with the starter catalog.
    pub async fn memory() -> Result<Self> {
        let store = MemoryStore::new();
        seed_starter_data(&store).await?;
        info!("using in-memory store; changes are discarded on exit");
        Ok(Self {
            store: Arc::new(store),
            pool: None,
        })
    }

    pub async fn open(config: &PlannerConfig, memory: bool) -> Result<Self> {
        if memory {
            Self::memory().await
        } else {
            Self::connect(config).await
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
        }
    }
}
