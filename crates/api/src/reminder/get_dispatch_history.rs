use crate::error::DocketError;
use crate::shared::auth::protect_operator_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use docket_api_structs::get_dispatch_history::{APIResponse, QueryParams};
use docket_domain::{DispatchRecord, ReminderKey, ReminderKind};
use docket_infra::DocketContext;

pub async fn get_dispatch_history_controller(
    http_req: HttpRequest,
    ctx: web::Data<DocketContext>,
    query: web::Query<QueryParams>,
) -> Result<HttpResponse, DocketError> {
    protect_operator_route(&http_req, &ctx)?;

    let query = query.into_inner();
    let reminder_type = match query.reminder_type {
        Some(reminder_type) => reminder_type
            .parse::<ReminderKind>()
            .map_err(|e| DocketError::BadClientData(e.to_string()))?,
        None => ReminderKind::Task,
    };

    let usecase = GetDispatchHistoryUseCase {
        reminder_type,
        reminder_key: ReminderKey::from(query.reminder_key),
    };

    execute(usecase, &ctx)
        .await
        .map(|dispatches| HttpResponse::Ok().json(APIResponse::new(dispatches)))
        .map_err(DocketError::from)
}

/// Lists every delivery attempt of a reminder, so operators can see why a
/// reminder did or did not arrive
#[derive(Debug)]
pub struct GetDispatchHistoryUseCase {
    pub reminder_type: ReminderKind,
    pub reminder_key: ReminderKey,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for DocketError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetDispatchHistoryUseCase {
    type Response = Vec<DispatchRecord>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetDispatchHistory";

    async fn execute(&mut self, ctx: &DocketContext) -> Result<Self::Response, Self::Error> {
        ctx.ledger
            .ensure_ready()
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.ledger
            .history(self.reminder_type, &self.reminder_key)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
