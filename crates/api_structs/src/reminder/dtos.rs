use docket_domain::{DispatchRecord, DispatchStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRecordDTO {
    pub id: ID,
    pub reminder_type: String,
    pub reminder_key: String,
    pub recipient: String,
    pub subject: String,
    pub status: DispatchStatus,
    pub error_message: Option<String>,
    pub attempted_at: i64,
    pub sent_at: Option<i64>,
}

impl DispatchRecordDTO {
    pub fn new(record: DispatchRecord) -> Self {
        Self {
            id: record.id,
            reminder_type: record.reminder_type.to_string(),
            reminder_key: record.reminder_key.to_string(),
            recipient: record.recipient,
            subject: record.subject,
            status: record.status,
            error_message: record.error_message,
            attempted_at: record.attempted_at,
            sent_at: record.sent_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispatchCycleSummaryDTO {
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
}
