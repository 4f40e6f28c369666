use super::ITaskRepo;
use docket_domain::Task;
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresTaskRepo {
    pool: PgPool,
}

impl PostgresTaskRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TaskRaw {
    id: i64,
    name: String,
    task_type: String,
    scheduled_at: i64,
    remind_at: i64,
    notes: Option<String>,
    assigned_employee_id: Option<i64>,
}

impl From<TaskRaw> for Task {
    fn from(e: TaskRaw) -> Self {
        Self {
            id: e.id,
            name: e.name,
            task_type: e.task_type,
            scheduled_at: e.scheduled_at,
            remind_at: e.remind_at,
            notes: e.notes,
            assigned_employee_id: e.assigned_employee_id,
        }
    }
}

#[async_trait::async_trait]
impl ITaskRepo for PostgresTaskRepo {
    async fn find_due(&self, from: i64, to: i64) -> anyhow::Result<Vec<Task>> {
        let tasks: Vec<TaskRaw> = sqlx::query_as(
            r#"
            SELECT id, name, task_type, scheduled_at, remind_at, notes, assigned_employee_id
            FROM administrative_tasks AS t
            WHERE t.remind_at BETWEEN $1 AND $2
            ORDER BY t.id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find due tasks between {} and {} failed. DB returned error: {:?}",
                from, to, e
            );
            e
        })?;

        Ok(tasks.into_iter().map(|t| t.into()).collect())
    }
}
