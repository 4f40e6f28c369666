use crate::{reminder::send_task_reminders::SendTaskRemindersUseCase, shared::usecase::execute};
use docket_infra::DocketContext;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Spawns the task reminder poller. It runs until `cancel` is cancelled.
pub fn start_send_reminders_job(ctx: DocketContext, cancel: CancellationToken) -> JoinHandle<()> {
    actix_web::rt::spawn(run_send_reminders_loop(ctx, cancel))
}

pub async fn run_send_reminders_loop(ctx: DocketContext, cancel: CancellationToken) {
    let poll_interval = ctx.config.reminders.poll_interval();
    info!(
        "Task reminder poller started, polling every {} seconds",
        poll_interval.as_secs()
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        if ctx.config.reminders.enabled {
            send_reminders(&ctx, &cancel).await;
        } else {
            debug!("Task reminders are disabled, skipping cycle");
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }

    info!("Task reminder poller stopped");
}

async fn send_reminders(ctx: &DocketContext, cancel: &CancellationToken) {
    let usecase = SendTaskRemindersUseCase {
        cancel: cancel.clone(),
    };
    // Errors are logged by `execute`, the next cycle just tries again
    if AssertUnwindSafe(execute(usecase, ctx))
        .catch_unwind()
        .await
        .is_err()
    {
        error!("Task reminder cycle panicked, continuing with the next cycle");
    }
}
