mod dispatch;
mod reminder;
mod shared;
mod task;
mod window;

pub use dispatch::{DispatchRecord, DispatchStatus, InvalidDispatchStatusError, RecordOutcome};
pub use reminder::{InvalidReminderKindError, ReminderKey, ReminderKind, TaskReminderMessage};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use task::{Recipient, Task};
pub use window::DueWindow;
