mod dispatch;
mod recipient;
mod shared;
mod task;

pub use dispatch::{IDispatchRepo, InMemoryDispatchRepo, PostgresDispatchRepo};
pub use recipient::{IRecipientRepo, InMemoryRecipientRepo, PostgresRecipientRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use task::{ITaskRepo, InMemoryTaskRepo, PostgresTaskRepo};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub tasks: Arc<dyn ITaskRepo>,
    pub recipients: Arc<dyn IRecipientRepo>,
    pub dispatches: Arc<dyn IDispatchRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            tasks: Arc::new(PostgresTaskRepo::new(pool.clone())),
            recipients: Arc::new(PostgresRecipientRepo::new(pool.clone())),
            dispatches: Arc::new(PostgresDispatchRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            tasks: Arc::new(InMemoryTaskRepo::new()),
            recipients: Arc::new(InMemoryRecipientRepo::new()),
            dispatches: Arc::new(InMemoryDispatchRepo::new()),
        }
    }
}
