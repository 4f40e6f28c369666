use docket_api::Application;
use docket_domain::{Recipient, Task};
use docket_infra::{
    Config, DocketContext, ISys, InMemoryDispatchRepo, InMemoryRecipientRepo, InMemoryTaskRepo,
    LogNotificationSender, Repos,
};
use std::sync::Arc;

/// Sun Feb 21 2021 00:00:00 GMT+0100
pub const NOW: i64 = 1613862000000;

struct FixedSys;

impl ISys for FixedSys {
    fn get_timestamp_millis(&self) -> i64 {
        NOW
    }
}

pub struct TestApp {
    pub config: Config,
    pub address: String,
    pub tasks: Arc<InMemoryTaskRepo>,
    pub recipients: Arc<InMemoryRecipientRepo>,
}

impl TestApp {
    pub fn add_task(&self, id: i64, remind_at: i64, assignee: Option<i64>) {
        self.tasks.insert(&Task {
            id,
            name: format!("Task {}", id),
            task_type: "Hearing".into(),
            scheduled_at: remind_at + 1000 * 60 * 60,
            remind_at,
            notes: None,
            assigned_employee_id: assignee,
        });
    }

    pub fn add_recipient(&self, id: i64, email: &str) {
        self.recipients.insert(&Recipient {
            id,
            email: Some(email.into()),
        });
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.address, path)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with<F: FnOnce(&mut Config)>(configure: F) -> TestApp {
    let tasks = Arc::new(InMemoryTaskRepo::new());
    let recipients = Arc::new(InMemoryRecipientRepo::new());
    let repos = Repos {
        tasks: tasks.clone(),
        recipients: recipients.clone(),
        dispatches: Arc::new(InMemoryDispatchRepo::new()),
    };

    let mut config = Config::new();
    config.port = 0; // Random port
    configure(&mut config);

    let ctx = DocketContext::new(
        repos,
        config.clone(),
        Arc::new(FixedSys),
        Arc::new(LogNotificationSender),
    );
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        config,
        address,
        tasks,
        recipients,
    }
}
