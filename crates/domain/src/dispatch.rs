use crate::reminder::{ReminderKey, ReminderKind};
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStatus {
    Sent,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "Sent",
            Self::Failed => "Failed",
        }
    }
}

impl Display for DispatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidDispatchStatusError {
    #[error("Unknown dispatch status: {0}")]
    Unknown(String),
}

impl FromStr for DispatchStatus {
    type Err = InvalidDispatchStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sent" => Ok(Self::Sent),
            "Failed" => Ok(Self::Failed),
            _ => Err(InvalidDispatchStatusError::Unknown(s.to_string())),
        }
    }
}

/// A `DispatchRecord` is one attempt at delivering one reminder to one recipient.
///
/// Records are append only. For a given `(reminder_type, reminder_key, recipient)`
/// at most one record will ever have the `Sent` status.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub id: ID,
    pub reminder_type: ReminderKind,
    pub reminder_key: ReminderKey,
    /// The address the reminder was delivered to
    pub recipient: String,
    pub subject: String,
    pub status: DispatchStatus,
    pub error_message: Option<String>,
    pub attempted_at: i64,
    /// Only set when `status` is `Sent`
    pub sent_at: Option<i64>,
}

impl DispatchRecord {
    pub fn new_attempt(
        reminder_type: ReminderKind,
        reminder_key: ReminderKey,
        recipient: &str,
        subject: &str,
        status: DispatchStatus,
        error_message: Option<String>,
        now: i64,
    ) -> Self {
        let sent_at = match status {
            DispatchStatus::Sent => Some(now),
            DispatchStatus::Failed => None,
        };
        Self {
            id: Default::default(),
            reminder_type,
            reminder_key,
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            status,
            error_message,
            attempted_at: now,
            sent_at,
        }
    }

    /// Whether this record belongs to the given `(type, key, recipient)` triple
    pub fn is_for(&self, reminder_type: ReminderKind, key: &ReminderKey, recipient: &str) -> bool {
        self.reminder_type == reminder_type
            && self.reminder_key == *key
            && self.recipient == recipient
    }
}

impl Entity<ID> for DispatchRecord {
    fn id(&self) -> ID {
        self.id
    }
}

/// What happened to a recorded attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// A `Sent` record already existed for the triple, so storage refused the
    /// second one.
    DuplicateSuppressed,
}
