use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        /// Whether the reminder poller is switched on
        pub reminders_enabled: bool,
        /// Whether the dispatch ledger storage has been provisioned by this process
        pub ledger_ready: bool,
    }
}
