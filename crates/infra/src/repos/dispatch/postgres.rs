use super::IDispatchRepo;
use anyhow::anyhow;
use docket_domain::{DispatchRecord, DispatchStatus, RecordOutcome, ReminderKey, ReminderKind};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, info};

/// Serializes schema provisioning between processes sharing the database
const PROVISION_LOCK_KEY: i64 = 0x646f_636b_6574;

const PROVISION_STATEMENTS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS reminder_dispatches (
        dispatch_uid UUID PRIMARY KEY,
        reminder_type TEXT NOT NULL,
        reminder_key TEXT NOT NULL,
        recipient TEXT NOT NULL,
        subject TEXT NOT NULL,
        status TEXT NOT NULL,
        error_message TEXT,
        attempted_at BIGINT NOT NULL,
        sent_at BIGINT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS reminder_dispatches_triple_idx
    ON reminder_dispatches (reminder_type, reminder_key, recipient)
    "#,
    // At most one successful delivery per (type, key, recipient)
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS reminder_dispatches_single_sent_idx
    ON reminder_dispatches (reminder_type, reminder_key, recipient)
    WHERE status = 'Sent'
    "#,
];

pub struct PostgresDispatchRepo {
    pool: PgPool,
}

impl PostgresDispatchRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DispatchRaw {
    dispatch_uid: Uuid,
    reminder_type: String,
    reminder_key: String,
    recipient: String,
    subject: String,
    status: String,
    error_message: Option<String>,
    attempted_at: i64,
    sent_at: Option<i64>,
}

impl TryFrom<DispatchRaw> for DispatchRecord {
    type Error = anyhow::Error;

    fn try_from(e: DispatchRaw) -> Result<Self, Self::Error> {
        Ok(Self {
            id: e.dispatch_uid.into(),
            reminder_type: e.reminder_type.parse()?,
            reminder_key: ReminderKey::from(e.reminder_key),
            recipient: e.recipient,
            subject: e.subject,
            status: e.status.parse()?,
            error_message: e.error_message,
            attempted_at: e.attempted_at,
            sent_at: e.sent_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CountRaw {
    count: i64,
}

#[async_trait::async_trait]
impl IDispatchRepo for PostgresDispatchRepo {
    async fn provision(&self) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(PROVISION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        for statement in PROVISION_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await.map_err(|e| {
                error!("Unable to provision the dispatch ledger. DB returned error: {:?}", e);
                e
            })?;
        }
        tx.commit().await?;
        info!("Dispatch ledger storage is provisioned");
        Ok(())
    }

    async fn has_successful_dispatch(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<bool> {
        let res: CountRaw = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count FROM reminder_dispatches AS d
            WHERE d.reminder_type = $1 AND d.reminder_key = $2 AND d.recipient = $3
            AND d.status = $4
            "#,
        )
        .bind(reminder_type.as_str())
        .bind(reminder_key.as_str())
        .bind(recipient)
        .bind(DispatchStatus::Sent.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(res.count > 0)
    }

    async fn attempt_count(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
        recipient: &str,
    ) -> anyhow::Result<i64> {
        let res: CountRaw = sqlx::query_as(
            r#"
            SELECT COUNT(*) AS count FROM reminder_dispatches AS d
            WHERE d.reminder_type = $1 AND d.reminder_key = $2 AND d.recipient = $3
            "#,
        )
        .bind(reminder_type.as_str())
        .bind(reminder_key.as_str())
        .bind(recipient)
        .fetch_one(&self.pool)
        .await?;

        Ok(res.count)
    }

    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<RecordOutcome> {
        let res = sqlx::query(
            r#"
            INSERT INTO reminder_dispatches
            (dispatch_uid, reminder_type, reminder_key, recipient, subject, status, error_message, attempted_at, sent_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(record.id.inner_ref())
        .bind(record.reminder_type.as_str())
        .bind(record.reminder_key.as_str())
        .bind(&record.recipient)
        .bind(&record.subject)
        .bind(record.status.as_str())
        .bind(&record.error_message)
        .bind(record.attempted_at)
        .bind(record.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert dispatch record: {:?}. DB returned error: {:?}",
                record, e
            );
            e
        })?;

        if res.rows_affected() == 0 {
            Ok(RecordOutcome::DuplicateSuppressed)
        } else {
            Ok(RecordOutcome::Recorded)
        }
    }

    async fn find_by_key(
        &self,
        reminder_type: ReminderKind,
        reminder_key: &ReminderKey,
    ) -> anyhow::Result<Vec<DispatchRecord>> {
        let records: Vec<DispatchRaw> = sqlx::query_as(
            r#"
            SELECT * FROM reminder_dispatches AS d
            WHERE d.reminder_type = $1 AND d.reminder_key = $2
            ORDER BY d.attempted_at
            "#,
        )
        .bind(reminder_type.as_str())
        .bind(reminder_key.as_str())
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(|raw| {
                let uid = raw.dispatch_uid;
                DispatchRecord::try_from(raw)
                    .map_err(|e| anyhow!("Malformed dispatch record {}: {}", uid, e))
            })
            .collect()
    }
}
