//! Fakes shared by the use case and job scheduler tests

use docket_domain::{Recipient, Task};
use docket_infra::{
    Config, DocketContext, INotificationSender, ISys, InMemoryDispatchRepo, InMemoryRecipientRepo,
    InMemoryTaskRepo, NotificationChannel, ReminderConfig, Repos,
};
use anyhow::anyhow;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// Sun Feb 21 2021 00:00:00 GMT+0100
pub const NOW: i64 = 1613862000000;
pub const MINUTE: i64 = 1000 * 60;

pub struct StaticTimeSys(AtomicI64);

impl StaticTimeSys {
    pub fn set(&self, ts: i64) {
        self.0.store(ts, Ordering::SeqCst);
    }
}

impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Remembers every send call and fails for the addresses it is told to
#[derive(Default)]
pub struct RecordingSender {
    pub calls: Mutex<Vec<SentMessage>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingSender {
    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn calls_to(&self, address: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.address == address)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl INotificationSender for RecordingSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, address: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(SentMessage {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.failing.lock().unwrap().contains(address) {
            return Err(anyhow!("mail relay rejected {}", address));
        }
        Ok(())
    }
}

pub struct TestContext {
    pub ctx: DocketContext,
    pub tasks: Arc<InMemoryTaskRepo>,
    pub recipients: Arc<InMemoryRecipientRepo>,
    pub sender: Arc<RecordingSender>,
    pub sys: Arc<StaticTimeSys>,
}

impl TestContext {
    pub fn add_recipient(&self, id: i64, email: Option<&str>) {
        self.recipients.insert(&Recipient {
            id,
            email: email.map(String::from),
        });
    }

    pub fn add_task(&self, id: i64, remind_at: i64, assignee: Option<i64>) -> Task {
        let task = Task {
            id,
            name: format!("Task {}", id),
            task_type: "Filing deadline".into(),
            scheduled_at: remind_at + 60 * MINUTE,
            remind_at,
            notes: None,
            assigned_employee_id: assignee,
        };
        self.tasks.insert(&task);
        task
    }
}

pub fn setup() -> TestContext {
    let tasks = Arc::new(InMemoryTaskRepo::new());
    let recipients = Arc::new(InMemoryRecipientRepo::new());
    let sender = Arc::new(RecordingSender::default());
    let sys = Arc::new(StaticTimeSys(AtomicI64::new(NOW)));

    let repos = Repos {
        tasks: tasks.clone(),
        recipients: recipients.clone(),
        dispatches: Arc::new(InMemoryDispatchRepo::new()),
    };
    let mut config = Config::new();
    config.reminders = ReminderConfig::default();

    let ctx = DocketContext::new(repos, config, sys.clone(), sender.clone());

    TestContext {
        ctx,
        tasks,
        recipients,
        sender,
        sys,
    }
}
