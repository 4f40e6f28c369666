use crate::task::Task;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Partitions the dispatch ledger by the kind of source event so that
/// other reminder categories can share it without key collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReminderKind {
    Task,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "Task",
        }
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidReminderKindError {
    #[error("Unknown reminder type: {0}")]
    Unknown(String),
}

impl FromStr for ReminderKind {
    type Err = InvalidReminderKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Task" => Ok(Self::Task),
            _ => Err(InvalidReminderKindError::Unknown(s.to_string())),
        }
    }
}

/// Identifies one specific firing of one specific reminder.
///
/// The reminder timestamp is part of the key, so editing the reminder time of
/// a `Task` produces a new reminder instead of a duplicate of the old one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderKey(String);

impl ReminderKey {
    pub fn for_task(task: &Task) -> Self {
        Self(format!("{}:{}", task.id, task.remind_at))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ReminderKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Display for ReminderKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskReminderMessage {
    pub subject: String,
    pub body: String,
}

fn format_millis(ts: i64) -> String {
    match Utc.timestamp_millis_opt(ts).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => ts.to_string(),
    }
}

impl TaskReminderMessage {
    pub fn render(task: &Task) -> Self {
        let mut body = format!(
            "This is a reminder for the task \"{}\".\n\nType: {}\nScheduled for: {}\nReminder time: {}\n",
            task.name,
            task.task_type,
            format_millis(task.scheduled_at),
            format_millis(task.remind_at),
        );
        if let Some(notes) = task.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            body.push_str(&format!("\nNotes:\n{}\n", notes));
        }

        Self {
            subject: format!("Reminder: {}", task.name),
            body,
        }
    }
}
