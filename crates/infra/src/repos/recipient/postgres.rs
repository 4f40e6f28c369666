use super::IRecipientRepo;
use docket_domain::Recipient;
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresRecipientRepo {
    pool: PgPool,
}

impl PostgresRecipientRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EmployeeRaw {
    id: i64,
    email: Option<String>,
}

#[async_trait::async_trait]
impl IRecipientRepo for PostgresRecipientRepo {
    async fn find_address(&self, recipient_id: i64) -> anyhow::Result<Option<String>> {
        let employee: Option<EmployeeRaw> = sqlx::query_as(
            r#"
            SELECT id, email FROM employees
            WHERE id = $1
            "#,
        )
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find employee with id: {} failed. DB returned error: {:?}",
                recipient_id, e
            );
            e
        })?;

        Ok(employee.and_then(|e| {
            Recipient {
                id: e.id,
                email: e.email,
            }
            .address()
            .map(String::from)
        }))
    }
}
