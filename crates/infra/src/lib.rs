mod config;
mod ledger;
mod repos;
mod services;
mod system;

pub use config::{
    Config, MailConfig, ReminderConfig, MAX_WINDOW_OFFSET_MINUTES, MIN_POLL_INTERVAL_MINUTES,
};
pub use ledger::DispatchLedger;
pub use repos::{
    IDispatchRepo, IRecipientRepo, ITaskRepo, InMemoryDispatchRepo, InMemoryRecipientRepo,
    InMemoryTaskRepo, Repos,
};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Clone)]
pub struct DocketContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub ledger: DispatchLedger,
    pub notifier: Arc<dyn INotificationSender>,
    /// Held while a reminder dispatch cycle runs so that cycles never overlap
    /// within one process
    pub dispatch_cycle_lock: Arc<Mutex<()>>,
}

impl DocketContext {
    pub fn new(
        repos: Repos,
        config: Config,
        sys: Arc<dyn ISys>,
        notifier: Arc<dyn INotificationSender>,
    ) -> Self {
        let ledger = DispatchLedger::new(repos.dispatches.clone(), sys.clone());
        Self {
            repos,
            config,
            sys,
            ledger,
            notifier,
            dispatch_cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn create_inmemory() -> Self {
        Self::new(
            Repos::create_inmemory(),
            Config::new(),
            Arc::new(RealSys {}),
            Arc::new(LogNotificationSender),
        )
    }
}

fn create_notifier(config: &Config) -> Arc<dyn INotificationSender> {
    match &config.mail.api_url {
        Some(api_url) => Arc::new(HttpEmailSender::new(
            api_url.clone(),
            config.mail.api_key.clone(),
            config.mail.from.clone(),
        )),
        None => {
            warn!("MAIL_API_URL is not set. Reminders will be logged instead of e-mailed.");
            Arc::new(LogNotificationSender)
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<DocketContext> {
    let config = Config::new();
    let repos = match &config.database_url {
        Some(url) => Repos::create_postgres(url).await?,
        None => {
            warn!("DATABASE_URL is not set. Falling back to in-memory storage, nothing will be persisted.");
            Repos::create_inmemory()
        }
    };
    let notifier = create_notifier(&config);

    Ok(DocketContext::new(
        repos,
        config,
        Arc::new(RealSys {}),
        notifier,
    ))
}
