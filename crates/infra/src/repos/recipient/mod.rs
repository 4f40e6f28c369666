mod inmemory;
mod postgres;

pub use inmemory::InMemoryRecipientRepo;
pub use postgres::PostgresRecipientRepo;

/// Resolves whoever a `Task` is assigned to into a deliverable address
#[async_trait::async_trait]
pub trait IRecipientRepo: Send + Sync {
    /// `None` when the recipient is unknown or has no address on file
    async fn find_address(&self, recipient_id: i64) -> anyhow::Result<Option<String>>;
}
