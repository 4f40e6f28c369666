mod inmemory;
mod postgres;

pub use inmemory::InMemoryDispatchRepo;
pub use postgres::PostgresDispatchRepo;

use docket_domain::{DispatchRecord, RecordOutcome, ReminderKey, ReminderKind};

/// Storage port for the append only log of reminder delivery attempts
#[async_trait::async_trait]
pub trait IDispatchRepo: Send + Sync {
    /// Creates the underlying storage structure if it is not already present.
    /// Has to be idempotent on its own, independent of any in-process state,
    /// because several processes may share the storage.
    async fn provision(&self) -> anyhow::Result<()>;
    async fn has_successful_dispatch(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<bool>;
    async fn attempt_count(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<i64>;
    /// Appends the record. A second `Sent` record for the same triple is
    /// refused and reported as `RecordOutcome::DuplicateSuppressed`.
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<RecordOutcome>;
    /// All attempts for a reminder across recipients, oldest first
    async fn find_by_key(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
    ) -> anyhow::Result<Vec<DispatchRecord>>;
}
