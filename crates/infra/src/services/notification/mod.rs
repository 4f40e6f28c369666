mod http_email;
mod logging;

pub use logging::LogNotificationSender;
pub use http_email::HttpEmailSender;

use std::fmt::Display;

/// The channel a sender delivers on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationChannel {
    Email,
}

impl Display for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Email => "email",
        };
        f.write_str(name)
    }
}

/// Something that can deliver a message to an address.
///
/// Any returned error is treated as a failed delivery of that one message.
#[async_trait::async_trait]
pub trait INotificationSender: Send + Sync {
    fn channel(&self) -> NotificationChannel;
    async fn send(&self, address: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}
