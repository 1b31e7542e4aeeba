use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn repohealth_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_repohealth"));
    cmd.env("HOME", home);
    cmd.env_remove("REPOHEALTH_CONFIG");
    cmd.env_remove("REPOHEALTH_UI_COLOR");
    cmd.env_remove("REPOHEALTH_API_BASE_URL");
    cmd.env_remove("REPOHEALTH_POLICY_README_SECTIONS");
    cmd.env_remove("REPOHEALTH_POLICY_MANIFESTS");
    cmd.env_remove("REPOHEALTH_REMEDIATION_ENABLED");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    repohealth_cmd(home)
        .args(args)
        .output()
        .expect("run repohealth")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let temp = std::env::temp_dir();
    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let uniq = format!("repohealth-config-test-{}-{seq}", std::process::id());
    let home = temp.join(uniq);
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    std::fs::write(path, bytes).expect("write");
}

fn show_config(home: &Path, extra: &[&str]) -> serde_json::Value {
    let mut args = extra.to_vec();
    args.extend(["config", "--show", "--json"]);
    let out = run(home, &args);
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("parse json")
}

#[test]
fn defaults_without_config_file() {
    let home = make_temp_home();
    let v = show_config(&home, &[]);
    assert_eq!(v["api"]["base_url"], "https://api.github.com");
    assert_eq!(
        v["policy"]["manifests"],
        serde_json::json!(["package.json", "requirements.txt"])
    );
    assert_eq!(v["remediation"]["rules"].as_array().map(Vec::len), Some(9));
    assert!(v.get("config_path").is_none());
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn default_config_file_overrides_policy() {
    let home = make_temp_home();
    write_file(
        home.join(".config/repohealth/config.toml").as_path(),
        br#"
[policy]
manifests = ["Cargo.toml", "pyproject.toml"]
readme_sections = ["Usage"]

[remediation]
disabled_rules = ["changelog"]
"#,
    );

    let v = show_config(&home, &[]);
    assert_eq!(
        v["policy"]["manifests"],
        serde_json::json!(["Cargo.toml", "pyproject.toml"])
    );
    assert_eq!(v["policy"]["readme_sections"], serde_json::json!(["usage"]));
    assert!(
        v["config_path"]
            .as_str()
            .is_some_and(|p| p.ends_with("config.toml"))
    );

    let out = run(&home, &["checks", "--json"]);
    assert!(out.status.success());
    let checks: serde_json::Value = serde_json::from_slice(&out.stdout).expect("parse json");
    let rules = checks["rules"].as_array().expect("rules array");
    assert_eq!(rules.len(), 8);
    assert!(!rules.iter().any(|r| r["name"] == "changelog"));
    assert_eq!(checks["checks"][0], "documentation");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn explicit_config_flag_beats_default_location() {
    let home = make_temp_home();
    write_file(
        home.join(".config/repohealth/config.toml").as_path(),
        b"[api]\nbase_url = \"https://default.example\"\n",
    );
    let custom = home.join("custom.toml");
    write_file(
        &custom,
        b"[api]\nbase_url = \"https://ghe.example/api/v3/\"\n",
    );

    let v = show_config(&home, &["--config", custom.to_str().expect("utf-8 path")]);
    assert_eq!(v["api"]["base_url"], "https://ghe.example/api/v3");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn custom_rule_table_replaces_defaults() {
    let home = make_temp_home();
    write_file(
        home.join(".config/repohealth/config.toml").as_path(),
        br#"
[[remediation.rules]]
name = "no-license"
check = "license"
contains = "missing"
title = "Please add a license"
"#,
    );

    let v = show_config(&home, &[]);
    assert_eq!(
        v["remediation"]["rules"],
        serde_json::json!([{
            "name": "no-license",
            "check": "license",
            "contains": "missing",
            "title": "Please add a license",
        }])
    );
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn invalid_config_exits_2() {
    let home = make_temp_home();
    write_file(
        home.join(".config/repohealth/config.toml").as_path(),
        b"[[remediation.rules]]\nname = \"x\"\ncheck = \"readme\"\ncontains = \"missing\"\ntitle = \"t\"\n",
    );
    let out = run(&home, &["config", "--show"]);
    assert_eq!(out.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&home);
}
