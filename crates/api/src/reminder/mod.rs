mod get_dispatch_history;
pub mod send_task_reminders;

use actix_web::web;
use get_dispatch_history::get_dispatch_history_controller;
use send_task_reminders::run_dispatch_cycle_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/dispatches",
        web::get().to(get_dispatch_history_controller),
    );
    cfg.route(
        "/reminders/cycle",
        web::post().to(run_dispatch_cycle_controller),
    );
}
