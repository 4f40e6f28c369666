use super::ITaskRepo;
use crate::repos::shared::inmemory_repo::*;
use docket_domain::Task;

pub struct InMemoryTaskRepo {
    tasks: std::sync::Mutex<Vec<Task>>,
}

impl InMemoryTaskRepo {
    pub fn new() -> Self {
        Self {
            tasks: std::sync::Mutex::new(vec![]),
        }
    }

    /// Stores the `Task`, replacing any existing `Task` with the same id.
    /// The reminder core never writes tasks, this is for seeding and tests.
    pub fn insert(&self, task: &Task) {
        self.tasks.lock().unwrap().retain(|t| t.id != task.id);
        insert(task, &self.tasks);
    }
}

impl Default for InMemoryTaskRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ITaskRepo for InMemoryTaskRepo {
    async fn find_due(&self, from: i64, to: i64) -> anyhow::Result<Vec<Task>> {
        let mut tasks = find_by(&self.tasks, |task| {
            from <= task.remind_at && task.remind_at <= to
        });
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }
}
