use crate::shared::entity::Entity;
use serde::{Deserialize, Serialize};

/// An administrative `Task` owned by the case management system.
///
/// The reminder dispatcher only ever reads `Task`s, it never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub name: String,
    /// Free form category label, e.g. "Filing deadline" or "Client call"
    pub task_type: String,
    /// The timestamp in millis the `Task` is scheduled for
    pub scheduled_at: i64,
    /// The timestamp in millis at which the assignee should be reminded
    pub remind_at: i64,
    pub notes: Option<String>,
    /// The employee responsible for the `Task`, if anyone is assigned
    pub assigned_employee_id: Option<i64>,
}

impl Entity<i64> for Task {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Someone a reminder can be delivered to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: i64,
    pub email: Option<String>,
}

impl Recipient {
    /// The deliverable address of this `Recipient`. Blank addresses
    /// are treated as missing.
    pub fn address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

impl Entity<i64> for Recipient {
    fn id(&self) -> i64 {
        self.id
    }
}
