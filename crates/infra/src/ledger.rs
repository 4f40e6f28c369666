use crate::repos::IDispatchRepo;
use crate::system::ISys;
use docket_domain::{
    DispatchRecord, DispatchStatus, RecordOutcome, ReminderKey, ReminderKind,
};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::warn;

/// The `DispatchLedger` is the durable record of reminder delivery attempts.
///
/// Together its operations make delivery idempotent: a reminder is attempted at
/// most `max_attempts_per_recipient` times and never again once an attempt has
/// succeeded, also across process restarts.
///
/// The storage is provisioned lazily by `ensure_ready`. The guard is owned by
/// the ledger, so every clone of it shares the same initialization.
#[derive(Clone)]
pub struct DispatchLedger {
    repo: Arc<dyn IDispatchRepo>,
    sys: Arc<dyn ISys>,
    ready: Arc<OnceCell<()>>,
}

impl DispatchLedger {
    pub fn new(repo: Arc<dyn IDispatchRepo>, sys: Arc<dyn ISys>) -> Self {
        Self {
            repo,
            sys,
            ready: Arc::new(OnceCell::new()),
        }
    }

    /// Provisions the ledger storage once. Concurrent first callers wait for the
    /// one provisioning in flight, later calls return immediately. A failed
    /// provisioning is returned to the caller and retried on the next call.
    pub async fn ensure_ready(&self) -> anyhow::Result<()> {
        self.ready
            .get_or_try_init(|| async { self.repo.provision().await })
            .await?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    pub async fn has_successful_dispatch(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<bool> {
        self.repo
            .has_successful_dispatch(reminder_type, reminder_key, recipient)
            .await
    }

    pub async fn get_attempt_count(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<i64> {
        self.repo
            .attempt_count(reminder_type, reminder_key, recipient)
            .await
    }

    /// Appends one attempt. `sent_at` is only stamped when `status` is `Sent`.
    pub async fn record_attempt(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
        subject: &str,
        status: DispatchStatus,
        error_message: Option<String>,
    ) -> anyhow::Result<RecordOutcome> {
        let record = DispatchRecord::new_attempt(
            reminder_type,
            reminder_key.clone(),
            recipient,
            subject,
            status,
            error_message,
            self.sys.get_timestamp_millis(),
        );
        let outcome = self.repo.insert(&record).await?;
        if outcome == RecordOutcome::DuplicateSuppressed {
            warn!(
                "A successful dispatch of {} reminder {} to {} was already recorded, suppressed the duplicate",
                reminder_type, reminder_key, recipient
            );
        }
        Ok(outcome)
    }

    pub async fn history(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
    ) -> anyhow::Result<Vec<DispatchRecord>> {
        self.repo.find_by_key(reminder_type, reminder_key).await
    }
}
