use super::IRecipientRepo;
use crate::repos::shared::inmemory_repo::*;
use docket_domain::Recipient;

pub struct InMemoryRecipientRepo {
    recipients: std::sync::Mutex<Vec<Recipient>>,
}

impl InMemoryRecipientRepo {
    pub fn new() -> Self {
        Self {
            recipients: std::sync::Mutex::new(vec![]),
        }
    }

    pub fn insert(&self, recipient: &Recipient) {
        insert(recipient, &self.recipients);
    }
}

impl Default for InMemoryRecipientRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IRecipientRepo for InMemoryRecipientRepo {
    async fn find_address(&self, recipient_id: i64) -> anyhow::Result<Option<String>> {
        Ok(find(&recipient_id, &self.recipients)
            .and_then(|recipient| recipient.address().map(String::from)))
    }
}
