use super::{INotificationSender, NotificationChannel};
use anyhow::anyhow;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Delivers e-mails through an http mail relay
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl HttpEmailSender {
    pub fn new(api_url: String, api_key: Option<String>, from: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_url,
            api_key,
            from,
        }
    }
}

#[async_trait::async_trait]
impl INotificationSender for HttpEmailSender {
    fn channel(&self) -> NotificationChannel {
        NotificationChannel::Email
    }

    async fn send(&self, address: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let mut req = self.client.post(&self.api_url).json(&SendEmailRequest {
            from: &self.from,
            to: address,
            subject,
            text: body,
        });
        if let Some(api_key) = &self.api_key {
            req = req.header("authorization", format!("Bearer {}", api_key));
        }

        let res = req.send().await.map_err(|e| {
            error!("[Network Error] Mail relay error. Error message: {:?}", e);
            anyhow::Error::new(e)
        })?;

        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let text = res.text().await.unwrap_or_default();
        Err(anyhow!(
            "Mail relay responded with status {}: {}",
            status,
            text
        ))
    }
}
