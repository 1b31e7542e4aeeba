use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{CheckId, CheckResult, RemediationTicket, TicketState};
use crate::remote::RemoteApi;

/// Files a ticket titled `title` when the message of `check` contains
/// `contains` (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationRule {
    pub name: String,
    pub check: CheckId,
    pub contains: String,
    pub title: String,
}

impl RemediationRule {
    pub fn new(name: &str, check: CheckId, contains: &str, title: &str) -> Self {
        Self {
            name: name.to_string(),
            check,
            contains: contains.to_string(),
            title: title.to_string(),
        }
    }

    /// Substring test on the rendered message only; the status is not
    /// consulted, so a failure message can match too.
    pub fn matches(&self, result: &CheckResult) -> bool {
        result.check == self.check
            && result
                .message
                .to_lowercase()
                .contains(&self.contains.to_lowercase())
    }
}

pub fn default_rules() -> Vec<RemediationRule> {
    vec![
        RemediationRule::new(
            "readme",
            CheckId::Documentation,
            "missing",
            "Missing README.md or essential sections",
        ),
        RemediationRule::new(
            "inactive-issues",
            CheckId::Issues,
            "long inactivity",
            "Unresolved issues with long inactivity",
        ),
        RemediationRule::new(
            "dependency-files",
            CheckId::Dependencies,
            "missing",
            "Missing dependency files",
        ),
        RemediationRule::new(
            "security",
            CheckId::Security,
            "security vulnerabilities",
            "Security vulnerabilities detected",
        ),
        RemediationRule::new(
            "license",
            CheckId::License,
            "missing",
            "License file missing",
        ),
        RemediationRule::new(
            "contributing",
            CheckId::Contributing,
            "missing",
            "Contributing guidelines missing",
        ),
        RemediationRule::new(
            "issue-templates",
            CheckId::IssueTemplates,
            "missing",
            "Issue templates missing",
        ),
        RemediationRule::new(
            "pull-request-templates",
            CheckId::PullRequestTemplates,
            "missing",
            "Pull request templates missing",
        ),
        RemediationRule::new(
            "changelog",
            CheckId::Changelog,
            "missing",
            "Changelog missing",
        ),
    ]
}

/// One planned ticket per matching rule, in rule order.
pub fn plan_tickets(results: &[CheckResult], rules: &[RemediationRule]) -> Vec<RemediationTicket> {
    rules
        .iter()
        .filter_map(|rule| {
            let result = results.iter().find(|r| rule.matches(r))?;
            Some(RemediationTicket {
                rule: rule.name.clone(),
                check: rule.check,
                title: rule.title.clone(),
                body: result.message.clone(),
                state: TicketState::Planned,
                error: None,
            })
        })
        .collect()
}

/// Submits every planned ticket. Failures are recorded on the ticket and never
/// abort the loop; with `dry_run` nothing is sent.
pub fn file_tickets(
    api: &dyn RemoteApi,
    tickets: &mut [RemediationTicket],
    dry_run: bool,
    mut on_outcome: impl FnMut(&RemediationTicket),
) {
    for ticket in tickets.iter_mut() {
        if ticket.state != TicketState::Planned {
            continue;
        }
        if dry_run {
            ticket.state = TicketState::Skipped;
        } else {
            match api.create_ticket(&ticket.title, &ticket.body) {
                Ok(()) => ticket.state = TicketState::Created,
                Err(err) => {
                    warn!(title = %ticket.title, error = %err, "ticket creation failed");
                    ticket.state = TicketState::Failed;
                    ticket.error = Some(err.to_string());
                }
            }
        }
        on_outcome(ticket);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::Value;

    use super::*;
    use crate::core::{CheckStatus, RepoName};
    use crate::remote::RemoteError;

    struct RecordingApi {
        repo: RepoName,
        fail_titles: Vec<&'static str>,
        created: RefCell<Vec<(String, String)>>,
    }

    impl RecordingApi {
        fn new(fail_titles: Vec<&'static str>) -> Self {
            Self {
                repo: "octo/widgets".parse().expect("repo"),
                fail_titles,
                created: RefCell::new(vec![]),
            }
        }
    }

    impl RemoteApi for RecordingApi {
        fn repository(&self) -> &RepoName {
            &self.repo
        }

        fn fetch(&self, path: &str) -> Result<Value, RemoteError> {
            Err(RemoteError::from_status(path, 404))
        }

        fn create_ticket(&self, title: &str, body: &str) -> Result<(), RemoteError> {
            if self.fail_titles.contains(&title) {
                return Err(RemoteError::from_status("issues", 422));
            }
            self.created
                .borrow_mut()
                .push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn result(check: CheckId, status: CheckStatus, message: &str) -> CheckResult {
        CheckResult::new(check, status, message)
    }

    #[test]
    fn incomplete_readme_matches_missing_rule() {
        let results = vec![result(
            CheckId::Documentation,
            CheckStatus::Incomplete,
            "README.md is present but missing sections: license.",
        )];
        let tickets = plan_tickets(&results, &default_rules());
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].title, "Missing README.md or essential sections");
        assert_eq!(tickets[0].body, results[0].message);
    }

    #[test]
    fn rules_only_look_at_their_own_check() {
        let results = vec![
            result(CheckId::Changelog, CheckStatus::Pass, "Changelog is present."),
            result(
                CheckId::Issues,
                CheckStatus::Attention,
                "Found 2 unresolved open issues.",
            ),
            result(
                CheckId::Contributing,
                CheckStatus::Missing,
                "Contributing guidelines are missing.",
            ),
        ];
        let tickets = plan_tickets(&results, &default_rules());
        let titles: Vec<&str> = tickets.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Contributing guidelines missing"]);
    }

    #[test]
    fn failed_security_lookup_still_matches_keyword() {
        let results = vec![result(
            CheckId::Security,
            CheckStatus::Inconclusive,
            "Could not retrieve security vulnerabilities.",
        )];
        let tickets = plan_tickets(&results, &default_rules());
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].title, "Security vulnerabilities detected");
        assert_eq!(tickets[0].body, "Could not retrieve security vulnerabilities.");
    }

    #[test]
    fn passing_security_check_files_nothing() {
        let results = vec![result(
            CheckId::Security,
            CheckStatus::Pass,
            "No reported vulnerabilities.",
        )];
        assert!(plan_tickets(&results, &default_rules()).is_empty());
    }

    #[test]
    fn tickets_follow_rule_order() {
        let results = vec![
            result(CheckId::Changelog, CheckStatus::Missing, "Changelog is missing."),
            result(
                CheckId::Security,
                CheckStatus::Attention,
                "Found 1 security vulnerabilities.",
            ),
            result(CheckId::License, CheckStatus::Missing, "License file is missing."),
        ];
        let titles: Vec<String> = plan_tickets(&results, &default_rules())
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Security vulnerabilities detected",
                "License file missing",
                "Changelog missing",
            ]
        );
    }

    #[test]
    fn failures_are_recorded_and_do_not_stop_filing() {
        let results = vec![
            result(CheckId::License, CheckStatus::Missing, "License file is missing."),
            result(CheckId::Changelog, CheckStatus::Missing, "Changelog is missing."),
        ];
        let mut tickets = plan_tickets(&results, &default_rules());
        let api = RecordingApi::new(vec!["License file missing"]);
        let mut seen = Vec::new();
        file_tickets(&api, &mut tickets, false, |t| seen.push(t.state));

        assert_eq!(seen, vec![TicketState::Failed, TicketState::Created]);
        assert!(tickets[0].error.as_deref().is_some_and(|e| e.contains("422")));
        assert_eq!(
            api.created.borrow().as_slice(),
            &[(
                "Changelog missing".to_string(),
                "Changelog is missing.".to_string()
            )]
        );
    }

    #[test]
    fn dry_run_sends_nothing() {
        let results = vec![result(
            CheckId::Changelog,
            CheckStatus::Missing,
            "Changelog is missing.",
        )];
        let mut tickets = plan_tickets(&results, &default_rules());
        let api = RecordingApi::new(vec![]);
        file_tickets(&api, &mut tickets, true, |_| {});
        assert_eq!(tickets[0].state, TicketState::Skipped);
        assert!(api.created.borrow().is_empty());
    }
}
