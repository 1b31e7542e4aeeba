use serde_json::Value;

use super::{CheckContext, Probe, probe};
use crate::core::{CheckId, CheckResult, CheckStatus};

pub(crate) struct FileProbe {
    check: CheckId,
    path: &'static str,
    present: &'static str,
    missing: &'static str,
    unreachable: &'static str,
}

pub(crate) static CONTRIBUTING: FileProbe = FileProbe {
    check: CheckId::Contributing,
    path: "contents/CONTRIBUTING.md",
    present: "Contributing guidelines are present.",
    missing: "Contributing guidelines are missing.",
    unreachable: "Could not check contributing guidelines.",
};

pub(crate) static ISSUE_TEMPLATES: FileProbe = FileProbe {
    check: CheckId::IssueTemplates,
    path: "contents/.github/ISSUE_TEMPLATE/",
    present: "Issue templates are present.",
    missing: "Issue templates are missing.",
    unreachable: "Could not check issue templates.",
};

pub(crate) static PULL_REQUEST_TEMPLATES: FileProbe = FileProbe {
    check: CheckId::PullRequestTemplates,
    path: "contents/.github/PULL_REQUEST_TEMPLATE.md",
    present: "Pull request templates are present.",
    missing: "Pull request templates are missing.",
    unreachable: "Could not check pull request templates.",
};

pub(crate) static CHANGELOG: FileProbe = FileProbe {
    check: CheckId::Changelog,
    path: "contents/CHANGELOG.md",
    present: "Changelog is present.",
    missing: "Changelog is missing.",
    unreachable: "Could not check changelog.",
};

pub(crate) fn file(ctx: &CheckContext<'_>, spec: &FileProbe) -> CheckResult {
    let id = spec.check;
    match probe(ctx, spec.path) {
        Probe::Present(_) => CheckResult::new(id, CheckStatus::Pass, spec.present),
        Probe::Absent(_) => CheckResult::new(id, CheckStatus::Missing, spec.missing),
        Probe::Unreachable(_) => CheckResult::new(id, CheckStatus::Inconclusive, spec.unreachable),
    }
}

pub fn license(ctx: &CheckContext<'_>) -> CheckResult {
    let missing = || {
        CheckResult::new(
            CheckId::License,
            CheckStatus::Missing,
            "License file is missing.",
        )
    };
    match probe(ctx, "license") {
        Probe::Present(value) => match value.get("license").filter(|l| !l.is_null()) {
            Some(license) => {
                let name = license
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("an unnamed");
                CheckResult::new(
                    CheckId::License,
                    CheckStatus::Pass,
                    format!("License file is present with {name} license."),
                )
            }
            None => missing(),
        },
        Probe::Absent(_) => missing(),
        Probe::Unreachable(_) => CheckResult::new(
            CheckId::License,
            CheckStatus::Inconclusive,
            "Could not check license.",
        ),
    }
}

pub fn security(ctx: &CheckContext<'_>) -> CheckResult {
    let count = match probe(ctx, "vulnerability-alerts") {
        Probe::Present(value) => value.get("total_count").and_then(Value::as_u64),
        Probe::Absent(_) | Probe::Unreachable(_) => None,
    };
    match count {
        Some(0) => CheckResult::new(
            CheckId::Security,
            CheckStatus::Pass,
            "No reported vulnerabilities.",
        ),
        Some(n) => CheckResult::new(
            CheckId::Security,
            CheckStatus::Attention,
            format!("Found {n} security vulnerabilities."),
        ),
        None => CheckResult::new(
            CheckId::Security,
            CheckStatus::Inconclusive,
            "Could not retrieve security vulnerabilities.",
        ),
    }
}

/// Existence only: a manifest that is present is reported for follow-up,
/// its contents are not parsed.
pub fn dependencies(ctx: &CheckContext<'_>) -> CheckResult {
    let mut details = Vec::with_capacity(ctx.policy.manifests.len());
    let mut any_missing = false;
    let mut any_unreachable = false;
    for file_name in &ctx.policy.manifests {
        let line = match probe(ctx, &format!("contents/{file_name}")) {
            Probe::Present(_) => format!("{file_name} found and needs further analysis."),
            Probe::Absent(_) => {
                any_missing = true;
                format!("{file_name} is missing.")
            }
            Probe::Unreachable(_) => {
                any_unreachable = true;
                format!("{file_name} could not be checked.")
            }
        };
        details.push(line);
    }

    let status = if any_missing {
        CheckStatus::Missing
    } else if any_unreachable {
        CheckStatus::Inconclusive
    } else {
        CheckStatus::Attention
    };
    let mut result = CheckResult::new(CheckId::Dependencies, status, details.join(", "));
    result.details = details;
    result
}
