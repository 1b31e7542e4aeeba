use serde_json::Value;
use tracing::{info, warn};

use crate::config::Policy;
use crate::core::{CheckId, CheckResult};
use crate::remote::{RemoteApi, RemoteError};

mod activity;
mod documentation;
mod presence;

pub use documentation::missing_sections;

pub struct CheckContext<'a> {
    pub api: &'a dyn RemoteApi,
    pub policy: &'a Policy,
}

/// Runs one check. Only the issue and pull request checks can fail: their
/// list and comment reads are not recoverable.
pub fn run_check(ctx: &CheckContext<'_>, id: CheckId) -> Result<CheckResult, RemoteError> {
    let result = match id {
        CheckId::Documentation => documentation::check(ctx),
        CheckId::Issues => activity::issues(ctx)?,
        CheckId::PullRequests => activity::pull_requests(ctx)?,
        CheckId::Dependencies => presence::dependencies(ctx),
        CheckId::Security => presence::security(ctx),
        CheckId::License => presence::license(ctx),
        CheckId::Contributing => presence::file(ctx, &presence::CONTRIBUTING),
        CheckId::IssueTemplates => presence::file(ctx, &presence::ISSUE_TEMPLATES),
        CheckId::PullRequestTemplates => {
            presence::file(ctx, &presence::PULL_REQUEST_TEMPLATES)
        }
        CheckId::Changelog => presence::file(ctx, &presence::CHANGELOG),
    };
    info!(check = %id, status = %result.status, "{}", result.message);
    Ok(result)
}

pub(crate) enum Probe {
    Present(Value),
    /// The platform answered with a failure status.
    Absent(RemoteError),
    /// No usable answer: transport failure or an undecodable body.
    Unreachable(RemoteError),
}

pub(crate) fn probe(ctx: &CheckContext<'_>, path: &str) -> Probe {
    match ctx.api.fetch(path) {
        Ok(value) => Probe::Present(value),
        Err(err) if err.status().is_some() => {
            if let RemoteError::Unauthorized { status, .. } = &err {
                warn!(
                    path,
                    status, "treating resource as absent; the token may lack access"
                );
            }
            Probe::Absent(err)
        }
        Err(err) => {
            warn!(path, error = %err, "resource could not be read");
            Probe::Unreachable(err)
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use serde_json::Value;

    use crate::core::RepoName;
    use crate::remote::{RemoteApi, RemoteError};

    pub enum Reply {
        Json(Value),
        Status(u16),
        Transport,
    }

    pub struct FakeApi {
        repo: RepoName,
        replies: HashMap<String, Reply>,
        pub fetched: RefCell<Vec<String>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self {
                repo: "octo/widgets".parse().expect("repo"),
                replies: HashMap::new(),
                fetched: RefCell::new(vec![]),
            }
        }

        pub fn with(mut self, path: &str, reply: Reply) -> Self {
            self.replies.insert(path.to_string(), reply);
            self
        }

        pub fn json(self, path: &str, value: Value) -> Self {
            self.with(path, Reply::Json(value))
        }
    }

    impl RemoteApi for FakeApi {
        fn repository(&self) -> &RepoName {
            &self.repo
        }

        fn fetch(&self, path: &str) -> Result<Value, RemoteError> {
            self.fetched.borrow_mut().push(path.to_string());
            match self.replies.get(path) {
                Some(Reply::Json(v)) => Ok(v.clone()),
                Some(Reply::Status(s)) => Err(RemoteError::from_status(path, *s)),
                Some(Reply::Transport) => Err(RemoteError::Transport {
                    path: path.to_string(),
                    message: "connection refused".to_string(),
                }),
                None => Err(RemoteError::from_status(path, 404)),
            }
        }

        fn create_ticket(&self, _title: &str, _body: &str) -> Result<(), RemoteError> {
            Ok(())
        }
    }
}
