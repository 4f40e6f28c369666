use crate::dtos::{DispatchCycleSummaryDTO, DispatchRecordDTO};
use docket_domain::DispatchRecord;
use serde::{Deserialize, Serialize};

pub mod get_dispatch_history {
    use super::*;

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        /// Defaults to `Task`
        pub reminder_type: Option<String>,
        pub reminder_key: String,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub dispatches: Vec<DispatchRecordDTO>,
    }

    impl APIResponse {
        pub fn new(dispatches: Vec<DispatchRecord>) -> Self {
            Self {
                dispatches: dispatches.into_iter().map(DispatchRecordDTO::new).collect(),
            }
        }
    }
}

pub mod run_dispatch_cycle {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub summary: DispatchCycleSummaryDTO,
    }
}
