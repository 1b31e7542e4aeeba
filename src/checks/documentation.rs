use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;

use super::{CheckContext, Probe, probe};
use crate::core::{CheckId, CheckResult, CheckStatus};

pub fn check(ctx: &CheckContext<'_>) -> CheckResult {
    match probe(ctx, "readme") {
        Probe::Present(value) => match decode_content(&value) {
            Ok(text) => classify(&text, &ctx.policy.readme_sections),
            Err(reason) => {
                tracing::warn!(%reason, "README.md content could not be decoded");
                unreadable()
            }
        },
        Probe::Absent(_) => CheckResult::new(
            CheckId::Documentation,
            CheckStatus::Missing,
            "README.md file is missing.",
        ),
        Probe::Unreachable(_) => unreadable(),
    }
}

fn unreadable() -> CheckResult {
    CheckResult::new(
        CheckId::Documentation,
        CheckStatus::Inconclusive,
        "Could not retrieve README.md.",
    )
}

pub(crate) fn classify(text: &str, sections: &[String]) -> CheckResult {
    let missing = missing_sections(text, sections);
    if missing.is_empty() {
        CheckResult::new(
            CheckId::Documentation,
            CheckStatus::Pass,
            "README.md is present and contains all essential sections.",
        )
    } else {
        CheckResult::new(
            CheckId::Documentation,
            CheckStatus::Incomplete,
            format!(
                "README.md is present but missing sections: {}.",
                missing.join(", ")
            ),
        )
    }
}

/// Section keywords not found anywhere in `text`, in policy order.
///
/// Plain case-insensitive substring search: a keyword mentioned in unrelated
/// prose counts as present.
pub fn missing_sections<'a>(text: &str, sections: &'a [String]) -> Vec<&'a str> {
    let haystack = text.to_lowercase();
    sections
        .iter()
        .map(String::as_str)
        .filter(|s| !haystack.contains(&s.to_lowercase()))
        .collect()
}

fn decode_content(value: &Value) -> Result<String, String> {
    let encoded = value
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| "response has no `content` field".to_string())?;
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| e.to_string())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
