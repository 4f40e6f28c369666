mod inmemory;
mod postgres;

pub use inmemory::InMemoryTaskRepo;
pub use postgres::PostgresTaskRepo;

use docket_domain::Task;

/// Read only view into the administrative tasks owned by the case
/// management system
#[async_trait::async_trait]
pub trait ITaskRepo: Send + Sync {
    /// Finds all `Task`s whose `remind_at` is within `[from, to]`
    async fn find_due(&self, from: i64, to: i64) -> anyhow::Result<Vec<Task>>;
}
