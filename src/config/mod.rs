use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::remediate::{RemediationRule, default_rules};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub ui: UiConfig,
    pub api: ApiConfig,
    pub policy: Policy,
    pub remediation: RemediationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub user_agent: String,
}

/// Classification policy shared by the checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub readme_sections: Vec<String>,
    pub manifests: Vec<String>,
    pub resolved_keyword: String,
    pub addressed_keyword: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemediationConfig {
    pub enabled: bool,
    pub disabled_rules: Vec<String>,
    pub rules: Vec<RemediationRule>,
}

impl RemediationConfig {
    /// Rules in submission order, minus the disabled ones.
    pub fn active_rules(&self) -> Vec<RemediationRule> {
        if !self.enabled {
            return vec![];
        }
        self.rules
            .iter()
            .filter(|r| !self.disabled_rules.iter().any(|d| d == &r.name))
            .cloned()
            .collect()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            readme_sections: ["installation", "usage", "contributing", "license", "changelog"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            manifests: vec!["package.json".to_string(), "requirements.txt".to_string()],
            resolved_keyword: "resolved".to_string(),
            addressed_keyword: "addressed".to_string(),
        }
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            ui: UiConfig { color: true },
            api: ApiConfig {
                base_url: DEFAULT_API_BASE_URL.to_string(),
                user_agent: format!("repohealth/{}", env!("CARGO_PKG_VERSION")),
            },
            policy: Policy::default(),
            remediation: RemediationConfig {
                enabled: true,
                disabled_rules: vec![],
                rules: default_rules(),
            },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    api: Option<RawApiConfig>,
    policy: Option<RawPolicy>,
    remediation: Option<RawRemediationConfig>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawApiConfig {
    base_url: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPolicy {
    readme_sections: Option<Vec<String>>,
    manifests: Option<Vec<String>>,
    resolved_keyword: Option<String>,
    addressed_keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRemediationConfig {
    enabled: Option<bool>,
    disabled_rules: Option<Vec<String>>,
    rules: Option<Vec<RemediationRule>>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/repohealth/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw)?;
        cfg.config_path = Some(path.display().to_string());
    } else if config_path.is_some() {
        return Err(anyhow::anyhow!(
            "config file does not exist: {}",
            path.display()
        ));
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) -> Result<()> {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
    }

    if let Some(api) = raw.api {
        if let Some(base_url) = api.base_url {
            cfg.api.base_url = validate_base_url(&base_url)?;
        }
        if let Some(user_agent) = api.user_agent {
            cfg.api.user_agent = user_agent;
        }
    }

    if let Some(policy) = raw.policy {
        if let Some(sections) = policy.readme_sections {
            cfg.policy.readme_sections = normalize_keywords(sections);
        }
        if let Some(manifests) = policy.manifests {
            cfg.policy.manifests = non_empty_list(manifests, "policy.manifests")?;
        }
        if let Some(keyword) = policy.resolved_keyword {
            cfg.policy.resolved_keyword = non_empty(keyword, "policy.resolved_keyword")?;
        }
        if let Some(keyword) = policy.addressed_keyword {
            cfg.policy.addressed_keyword = non_empty(keyword, "policy.addressed_keyword")?;
        }
    }

    if let Some(remediation) = raw.remediation {
        if let Some(enabled) = remediation.enabled {
            cfg.remediation.enabled = enabled;
        }
        if let Some(disabled) = remediation.disabled_rules {
            cfg.remediation.disabled_rules = disabled;
        }
        if let Some(rules) = remediation.rules {
            cfg.remediation.rules = rules
                .into_iter()
                .map(validate_rule)
                .collect::<Result<_>>()?;
        }
    }

    Ok(())
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("REPOHEALTH_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "REPOHEALTH_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("REPOHEALTH_API_BASE_URL") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.api.base_url = validate_base_url(v).with_context(|| "REPOHEALTH_API_BASE_URL")?;
        }
    }
    if let Ok(v) = std::env::var("REPOHEALTH_POLICY_README_SECTIONS") {
        let parts = split_list(&v);
        if !parts.is_empty() {
            cfg.policy.readme_sections = normalize_keywords(parts);
        }
    }
    if let Ok(v) = std::env::var("REPOHEALTH_POLICY_MANIFESTS") {
        let parts = split_list(&v);
        if !parts.is_empty() {
            cfg.policy.manifests = parts;
        }
    }
    if let Ok(v) = std::env::var("REPOHEALTH_REMEDIATION_ENABLED") {
        cfg.remediation.enabled =
            parse_bool(&v).with_context(|| "REPOHEALTH_REMEDIATION_ENABLED")?;
    }

    Ok(())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

fn normalize_keywords(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn non_empty(value: String, key: &str) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow::anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn non_empty_list(values: Vec<String>, key: &str) -> Result<Vec<String>> {
    let values: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(anyhow::anyhow!("{key} must list at least one entry"));
    }
    Ok(values)
}

/// An empty `contains` would match every result of the rule's check.
fn validate_rule(rule: RemediationRule) -> Result<RemediationRule> {
    let name = non_empty(rule.name, "remediation.rules.name")?;
    Ok(RemediationRule {
        contains: non_empty(rule.contains, &format!("remediation.rules[{name}].contains"))?,
        title: non_empty(rule.title, &format!("remediation.rules[{name}].title"))?,
        check: rule.check,
        name,
    })
}

fn validate_base_url(s: &str) -> Result<String> {
    let s = s.trim().trim_end_matches('/');
    if s.starts_with("https://") || s.starts_with("http://") {
        Ok(s.to_string())
    } else {
        Err(anyhow::anyhow!(
            "invalid API base URL: {s} (expected http:// or https://)"
        ))
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
