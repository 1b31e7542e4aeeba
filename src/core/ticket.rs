use serde::{Deserialize, Serialize};

use crate::core::CheckId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketState {
    Planned,
    Created,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationTicket {
    pub rule: String,
    pub check: CheckId,
    pub title: String,
    pub body: String,
    pub state: TicketState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
