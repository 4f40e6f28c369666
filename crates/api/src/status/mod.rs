use actix_web::{web, HttpResponse};
use docket_api_structs::get_service_health::*;
use docket_infra::DocketContext;

async fn status(ctx: web::Data<DocketContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        reminders_enabled: ctx.config.reminders.enabled,
        ledger_ready: ctx.ledger.is_ready(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
