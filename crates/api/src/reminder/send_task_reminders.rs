use crate::error::DocketError;
use crate::shared::auth::protect_operator_route;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use docket_api_structs::dtos::DispatchCycleSummaryDTO;
use docket_api_structs::run_dispatch_cycle::APIResponse;
use docket_domain::{
    DispatchStatus, DueWindow, ReminderKey, ReminderKind, Task, TaskReminderMessage,
};
use docket_infra::DocketContext;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub async fn run_dispatch_cycle_controller(
    http_req: HttpRequest,
    ctx: web::Data<DocketContext>,
    shutdown: web::Data<CancellationToken>,
) -> Result<HttpResponse, DocketError> {
    protect_operator_route(&http_req, &ctx)?;

    let usecase = SendTaskRemindersUseCase {
        cancel: shutdown.get_ref().clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|summary| {
            HttpResponse::Ok().json(APIResponse {
                summary: summary.into(),
            })
        })
        .map_err(DocketError::from)
}

/// One poll cycle of the task reminder dispatcher.
///
/// Finds the `Task`s whose reminder is due, resolves who should be reminded and
/// delivers the reminder unless the `DispatchLedger` says it already went out or
/// the attempt ceiling is reached. A failure for one `Task` never stops the
/// others from being processed.
#[derive(Debug)]
pub struct SendTaskRemindersUseCase {
    /// Checked between tasks so that shutdown does not wait for a whole cycle
    pub cancel: CancellationToken,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    Disabled,
    LedgerUnavailable(String),
    StorageError(String),
}

impl From<UseCaseError> for DocketError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::Disabled => {
                Self::Conflict("Task reminders are disabled by configuration".into())
            }
            UseCaseError::LedgerUnavailable(_) | UseCaseError::StorageError(_) => {
                Self::InternalError
            }
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct DispatchCycleSummary {
    /// Tasks with a reminder in the due window
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
    /// Nobody to remind, already reminded or given up on
    pub skipped: usize,
    /// Tasks that could not be processed because of a storage error
    pub errored: usize,
}

impl DispatchCycleSummary {
    fn add(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Sent => self.sent += 1,
            TaskOutcome::Failed => self.failed += 1,
            TaskOutcome::NoRecipient
            | TaskOutcome::NoAddress
            | TaskOutcome::AlreadySent
            | TaskOutcome::AttemptsExhausted => self.skipped += 1,
        }
    }
}

impl From<DispatchCycleSummary> for DispatchCycleSummaryDTO {
    fn from(s: DispatchCycleSummary) -> Self {
        Self {
            due: s.due,
            sent: s.sent,
            failed: s.failed,
            skipped: s.skipped,
            errored: s.errored,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TaskOutcome {
    Sent,
    Failed,
    NoRecipient,
    NoAddress,
    AlreadySent,
    AttemptsExhausted,
}

async fn dispatch_task_reminder(task: &Task, ctx: &DocketContext) -> anyhow::Result<TaskOutcome> {
    let employee_id = match task.assigned_employee_id {
        Some(id) => id,
        None => {
            debug!("Task {} has no assignee, skipping reminder", task.id);
            return Ok(TaskOutcome::NoRecipient);
        }
    };
    let address = match ctx.repos.recipients.find_address(employee_id).await? {
        Some(address) => address,
        None => {
            debug!(
                "Employee {} assigned to task {} has no e-mail address, skipping reminder",
                employee_id, task.id
            );
            return Ok(TaskOutcome::NoAddress);
        }
    };

    let kind = ReminderKind::Task;
    let key = ReminderKey::for_task(task);

    if ctx
        .ledger
        .has_successful_dispatch(kind, &key, &address)
        .await?
    {
        return Ok(TaskOutcome::AlreadySent);
    }
    let attempts = ctx.ledger.get_attempt_count(kind, &key, &address).await?;
    if attempts >= ctx.config.reminders.max_attempts_per_recipient {
        debug!(
            "Giving up on reminder {} to {} after {} attempts",
            key, address, attempts
        );
        return Ok(TaskOutcome::AttemptsExhausted);
    }

    let message = TaskReminderMessage::render(task);
    match ctx
        .notifier
        .send(&address, &message.subject, &message.body)
        .await
    {
        Ok(()) => {
            ctx.ledger
                .record_attempt(
                    kind,
                    &key,
                    &address,
                    &message.subject,
                    DispatchStatus::Sent,
                    None,
                )
                .await?;
            Ok(TaskOutcome::Sent)
        }
        Err(e) => {
            warn!(
                "Unable to send reminder {} to {} over {} (attempt {}). Error: {:#}",
                key,
                address,
                ctx.notifier.channel(),
                attempts + 1,
                e
            );
            ctx.ledger
                .record_attempt(
                    kind,
                    &key,
                    &address,
                    &message.subject,
                    DispatchStatus::Failed,
                    Some(format!("{:#}", e)),
                )
                .await?;
            Ok(TaskOutcome::Failed)
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendTaskRemindersUseCase {
    type Response = DispatchCycleSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "SendTaskReminders";

    async fn execute(&mut self, ctx: &DocketContext) -> Result<Self::Response, Self::Error> {
        let config = &ctx.config.reminders;
        if !config.enabled {
            return Err(UseCaseError::Disabled);
        }
        let _cycle_guard = ctx.dispatch_cycle_lock.lock().await;

        ctx.ledger
            .ensure_ready()
            .await
            .map_err(|e| UseCaseError::LedgerUnavailable(format!("{:#}", e)))?;

        let window = DueWindow::around(
            ctx.sys.get_timestamp_millis(),
            config.grace_minutes,
            config.look_ahead_minutes,
        );
        let tasks = ctx
            .repos
            .tasks
            .find_due(window.from, window.to)
            .await
            .map_err(|e| UseCaseError::StorageError(format!("{:#}", e)))?;

        let mut summary = DispatchCycleSummary {
            due: tasks.len(),
            ..Default::default()
        };
        for task in &tasks {
            if self.cancel.is_cancelled() {
                info!("Shutdown requested, leaving the remaining task reminders for later");
                break;
            }
            match dispatch_task_reminder(task, ctx).await {
                Ok(outcome) => summary.add(outcome),
                Err(e) => {
                    error!("Unable to process reminder for task {}. Error: {:#}", task.id, e);
                    summary.errored += 1;
                }
            }
        }

        if summary.sent + summary.failed + summary.errored > 0 {
            info!("Task reminder cycle done: {:?}", summary);
        } else {
            debug!("Task reminder cycle done: {:?}", summary);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup, TestContext, MINUTE, NOW};
    use docket_domain::DispatchRecord;

    async fn run_cycle(ctx: &DocketContext) -> Result<DispatchCycleSummary, UseCaseError> {
        let mut usecase = SendTaskRemindersUseCase {
            cancel: CancellationToken::new(),
        };
        usecase.execute(ctx).await
    }

    async fn history(test: &TestContext, task: &Task) -> Vec<DispatchRecord> {
        test.ctx
            .ledger
            .history(ReminderKind::Task, &ReminderKey::for_task(task))
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn sends_a_due_reminder_exactly_once() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        let task = test.add_task(42, NOW, Some(1));

        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(summary.due, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(test.sender.calls_to("a@firm.example"), 1);

        let records = history(&test, &task).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reminder_key.as_str(), format!("42:{}", NOW));
        assert_eq!(records[0].recipient, "a@firm.example");
        assert_eq!(records[0].status, DispatchStatus::Sent);
        assert_eq!(records[0].subject, "Reminder: Task 42");
        assert_eq!(records[0].sent_at, Some(NOW));

        // The window still covers the task one minute later
        test.sys.set(NOW + MINUTE);
        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(test.sender.calls_to("a@firm.example"), 1);
        assert!(test
            .ctx
            .ledger
            .has_successful_dispatch(
                ReminderKind::Task,
                &ReminderKey::for_task(&task),
                "a@firm.example"
            )
            .await
            .unwrap());
        assert_eq!(history(&test, &task).await.len(), 1);
    }

    #[actix_web::test]
    async fn gives_up_after_the_attempt_ceiling() {
        let test = setup();
        test.add_recipient(2, Some("b@firm.example"));
        test.sender.fail_for("b@firm.example");
        let task = test.add_task(43, NOW, Some(2));

        for _ in 0..3 {
            let summary = run_cycle(&test.ctx).await.unwrap();
            assert_eq!(summary.failed, 1);
        }
        assert_eq!(test.sender.calls_to("b@firm.example"), 3);

        let records = history(&test, &task).await;
        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.status, DispatchStatus::Failed);
            assert_eq!(record.sent_at, None);
            assert_eq!(
                record.error_message.as_deref(),
                Some("mail relay rejected b@firm.example")
            );
        }

        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 1);
        assert_eq!(test.sender.calls_to("b@firm.example"), 3);
        assert_eq!(history(&test, &task).await.len(), 3);
    }

    #[actix_web::test]
    async fn respects_a_configured_attempt_ceiling() {
        let mut test = setup();
        test.ctx.config.reminders.max_attempts_per_recipient = 1;
        test.add_recipient(2, Some("b@firm.example"));
        test.sender.fail_for("b@firm.example");
        test.add_task(43, NOW, Some(2));

        run_cycle(&test.ctx).await.unwrap();
        run_cycle(&test.ctx).await.unwrap();
        assert_eq!(test.sender.calls_to("b@firm.example"), 1);
    }

    #[actix_web::test]
    async fn due_window_edges_are_inclusive() {
        let test = setup();
        let look_ahead = test.ctx.config.reminders.look_ahead_minutes * MINUTE;
        let grace = test.ctx.config.reminders.grace_minutes * MINUTE;

        for (id, email, remind_at) in [
            (1, "ahead@firm.example", NOW + look_ahead),
            (2, "too-far@firm.example", NOW + look_ahead + 1),
            (3, "grace@firm.example", NOW - grace),
            (4, "too-late@firm.example", NOW - grace - 1),
        ] {
            test.add_recipient(id, Some(email));
            test.add_task(id, remind_at, Some(id));
        }

        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(summary.due, 2);
        assert_eq!(test.sender.calls_to("ahead@firm.example"), 1);
        assert_eq!(test.sender.calls_to("grace@firm.example"), 1);
        assert_eq!(test.sender.calls_to("too-far@firm.example"), 0);
        assert_eq!(test.sender.calls_to("too-late@firm.example"), 0);
    }

    #[actix_web::test]
    async fn skips_tasks_without_a_deliverable_recipient() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        test.add_recipient(2, None);
        let unassigned = test.add_task(10, NOW, None);
        let no_address = test.add_task(11, NOW, Some(2));
        let unknown = test.add_task(12, NOW, Some(404));
        let assigned = test.add_task(13, NOW, Some(1));

        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(
            summary,
            DispatchCycleSummary {
                due: 4,
                sent: 1,
                failed: 0,
                skipped: 3,
                errored: 0,
            }
        );
        assert_eq!(test.sender.total_calls(), 1);
        for task in [&unassigned, &no_address, &unknown] {
            assert!(history(&test, task).await.is_empty());
        }
        assert_eq!(history(&test, &assigned).await.len(), 1);
    }

    #[actix_web::test]
    async fn a_failing_send_does_not_affect_other_tasks() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        test.add_recipient(2, Some("b@firm.example"));
        test.sender.fail_for("a@firm.example");
        let task_a = test.add_task(1, NOW, Some(1));
        let task_b = test.add_task(2, NOW, Some(2));

        let summary = run_cycle(&test.ctx).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 1);

        let records_a = history(&test, &task_a).await;
        assert_eq!(records_a.len(), 1);
        assert_eq!(records_a[0].status, DispatchStatus::Failed);
        let records_b = history(&test, &task_b).await;
        assert_eq!(records_b.len(), 1);
        assert_eq!(records_b[0].status, DispatchStatus::Sent);
    }

    #[actix_web::test]
    async fn a_moved_reminder_is_sent_again() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        let mut task = test.add_task(42, NOW, Some(1));
        run_cycle(&test.ctx).await.unwrap();

        task.remind_at = NOW + 10 * MINUTE;
        test.tasks.insert(&task);
        run_cycle(&test.ctx).await.unwrap();

        assert_eq!(test.sender.calls_to("a@firm.example"), 2);
        assert_eq!(history(&test, &task).await.len(), 1);
    }

    #[actix_web::test]
    async fn renders_the_task_into_the_message() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        test.add_task(42, NOW, Some(1));
        run_cycle(&test.ctx).await.unwrap();

        let calls = test.sender.calls.lock().unwrap();
        assert_eq!(calls[0].subject, "Reminder: Task 42");
        assert!(calls[0].body.contains("Type: Filing deadline"));
    }

    #[actix_web::test]
    async fn does_nothing_when_disabled() {
        let mut test = setup();
        test.ctx.config.reminders.enabled = false;
        test.add_recipient(1, Some("a@firm.example"));
        test.add_task(42, NOW, Some(1));

        assert_eq!(run_cycle(&test.ctx).await, Err(UseCaseError::Disabled));
        assert_eq!(test.sender.total_calls(), 0);
    }

    #[actix_web::test]
    async fn stops_between_tasks_when_cancelled() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        test.add_task(1, NOW, Some(1));
        test.add_task(2, NOW, Some(1));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut usecase = SendTaskRemindersUseCase { cancel };
        let summary = usecase.execute(&test.ctx).await.unwrap();

        assert_eq!(summary.due, 2);
        assert_eq!(summary.sent, 0);
        assert_eq!(test.sender.total_calls(), 0);
    }

    struct UnreachableDispatchRepo;

    #[async_trait::async_trait]
    impl docket_infra::IDispatchRepo for UnreachableDispatchRepo {
        async fn provision(&self) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn has_successful_dispatch(
            &self,
            _: ReminderKind,
            _: &ReminderKey,
            _: &str,
        ) -> anyhow::Result<bool> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn attempt_count(
            &self,
            _: ReminderKind,
            _: &ReminderKey,
            _: &str,
        ) -> anyhow::Result<i64> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn insert(
            &self,
            _: &DispatchRecord,
        ) -> anyhow::Result<docket_domain::RecordOutcome> {
            Err(anyhow::anyhow!("connection refused"))
        }

        async fn find_by_key(
            &self,
            _: ReminderKind,
            _: &ReminderKey,
        ) -> anyhow::Result<Vec<DispatchRecord>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[actix_web::test]
    async fn an_unreachable_ledger_abandons_the_cycle() {
        let test = setup();
        test.add_recipient(1, Some("a@firm.example"));
        test.add_task(42, NOW, Some(1));

        let mut repos = test.ctx.repos.clone();
        repos.dispatches = std::sync::Arc::new(UnreachableDispatchRepo);
        let ctx = DocketContext::new(
            repos,
            test.ctx.config.clone(),
            test.sys.clone(),
            test.sender.clone(),
        );

        assert_eq!(
            run_cycle(&ctx).await,
            Err(UseCaseError::LedgerUnavailable("connection refused".into()))
        );
        assert_eq!(test.sender.total_calls(), 0);
        assert!(!ctx.ledger.is_ready());
    }

    mod controller {
        use super::*;
        use actix_web::{test, App};

        async fn post_cycle(test_ctx: &TestContext, shutdown: CancellationToken) -> APIResponse {
            let app = test::init_service(
                App::new()
                    .app_data(web::Data::new(test_ctx.ctx.clone()))
                    .app_data(web::Data::new(shutdown))
                    .route("/reminders/cycle", web::post().to(run_dispatch_cycle_controller)),
            )
            .await;
            let req = test::TestRequest::post()
                .uri("/reminders/cycle")
                .insert_header(("x-api-key", test_ctx.ctx.config.api_key.as_str()))
                .to_request();
            test::call_and_read_body_json(&app, req).await
        }

        #[actix_web::test]
        async fn manual_cycle_sends_due_reminders() {
            let test = setup();
            test.add_recipient(1, Some("a@firm.example"));
            test.add_task(42, NOW, Some(1));

            let res = post_cycle(&test, CancellationToken::new()).await;
            assert_eq!(res.summary.due, 1);
            assert_eq!(res.summary.sent, 1);
            assert_eq!(test.sender.total_calls(), 1);
        }

        #[actix_web::test]
        async fn manual_cycle_honours_the_shutdown_signal() {
            let test = setup();
            test.add_recipient(1, Some("a@firm.example"));
            test.add_task(42, NOW, Some(1));
            test.add_task(43, NOW, Some(1));

            let shutdown = CancellationToken::new();
            shutdown.cancel();
            let res = post_cycle(&test, shutdown).await;
            assert_eq!(res.summary.due, 2);
            assert_eq!(res.summary.sent, 0);
            assert_eq!(test.sender.total_calls(), 0);
        }
    }
}
