use super::IDispatchRepo;
use crate::repos::shared::inmemory_repo::*;
use docket_domain::{DispatchRecord, DispatchStatus, RecordOutcome, ReminderKey, ReminderKind};

pub struct InMemoryDispatchRepo {
    dispatches: std::sync::Mutex<Vec<DispatchRecord>>,
}

impl InMemoryDispatchRepo {
    pub fn new() -> Self {
        Self {
            dispatches: std::sync::Mutex::new(vec![]),
        }
    }
}

impl Default for InMemoryDispatchRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IDispatchRepo for InMemoryDispatchRepo {
    async fn provision(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn has_successful_dispatch(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<bool> {
        let sent = count_by(&self.dispatches, |d| {
            d.is_for(reminder_type, reminder_key, recipient) && d.status == DispatchStatus::Sent
        });
        Ok(sent > 0)
    }

    async fn attempt_count(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<i64> {
        let count = count_by(&self.dispatches, |d| {
            d.is_for(reminder_type, reminder_key, recipient)
        });
        Ok(count as i64)
    }

    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<RecordOutcome> {
        if record.status != DispatchStatus::Sent {
            insert(record, &self.dispatches);
            return Ok(RecordOutcome::Recorded);
        }

        let inserted = insert_unless(record, &self.dispatches, |d| {
            d.is_for(record.reminder_type, &record.reminder_key, &record.recipient)
                && d.status == DispatchStatus::Sent
        });
        if inserted {
            Ok(RecordOutcome::Recorded)
        } else {
            Ok(RecordOutcome::DuplicateSuppressed)
        }
    }

    async fn find_by_key(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
    ) -> anyhow::Result<Vec<DispatchRecord>> {
        let mut records = find_by(&self.dispatches, |d| {
            d.reminder_type == reminder_type && d.reminder_key == *reminder_key
        });
        records.sort_by_key(|d| d.attempted_at);
        Ok(records)
    }
}
