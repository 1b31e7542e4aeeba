use crate::core::{CheckId, CheckResult, RemediationTicket, RepoName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub schema_version: String,
    pub tool_version: String,
    pub repository: RepoName,
    pub generated_at: String,
    pub results: Vec<CheckResult>,
    pub tickets: Vec<RemediationTicket>,
}

impl AuditReport {
    pub fn result(&self, check: CheckId) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.check == check)
    }
}
