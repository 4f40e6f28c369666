use super::{INotificationSender, NotificationChannel};
use tracing::info;

/// Sender used when no mail relay is configured. The message only ends up
/// in the logs.
pub struct LogNotificationSender;

#[async_trait::async_trait]
impl INotificationSender for LogNotificationSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, address: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(
            to = address,
            subject = subject,
            "No mail relay configured, logging notification instead: {}",
            body
        );
        Ok(())
    }
}
