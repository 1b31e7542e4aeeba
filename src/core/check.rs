use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    Documentation,
    Issues,
    PullRequests,
    Dependencies,
    Security,
    License,
    Contributing,
    IssueTemplates,
    PullRequestTemplates,
    Changelog,
}

impl CheckId {
    /// Every check, in report order.
    pub const ALL: [CheckId; 10] = [
        CheckId::Documentation,
        CheckId::Issues,
        CheckId::PullRequests,
        CheckId::Dependencies,
        CheckId::Security,
        CheckId::License,
        CheckId::Contributing,
        CheckId::IssueTemplates,
        CheckId::PullRequestTemplates,
        CheckId::Changelog,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CheckId::Documentation => "documentation",
            CheckId::Issues => "issues",
            CheckId::PullRequests => "pull_requests",
            CheckId::Dependencies => "dependencies",
            CheckId::Security => "security",
            CheckId::License => "license",
            CheckId::Contributing => "contributing",
            CheckId::IssueTemplates => "issue_templates",
            CheckId::PullRequestTemplates => "pull_request_templates",
            CheckId::Changelog => "changelog",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CheckId::Documentation => "Documentation",
            CheckId::Issues => "Open Issues",
            CheckId::PullRequests => "Open Pull Requests",
            CheckId::Dependencies => "Dependencies Status",
            CheckId::Security => "Security Status",
            CheckId::License => "License",
            CheckId::Contributing => "Contributing Guidelines",
            CheckId::IssueTemplates => "Issue Templates",
            CheckId::PullRequestTemplates => "Pull Request Templates",
            CheckId::Changelog => "Changelog",
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        CheckId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = CheckId::ALL.iter().map(|id| id.as_str()).collect();
                format!("unknown check: {s} (expected one of {})", known.join("|"))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Incomplete,
    Missing,
    Attention,
    Inconclusive,
}

impl CheckStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Incomplete => "incomplete",
            CheckStatus::Missing => "missing",
            CheckStatus::Attention => "attention",
            CheckStatus::Inconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckId,
    pub status: CheckStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl CheckResult {
    pub fn new(check: CheckId, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            check,
            status,
            message: message.into(),
            details: vec![],
        }
    }
}
