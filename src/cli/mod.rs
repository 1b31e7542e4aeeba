use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;

use crate::config::EffectiveConfig;
use crate::core::{AuditReport, RepoName};
use crate::engine::{AuditOptions, Auditor};
use crate::remote::{ClientOptions, GithubClient};
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "repohealth",
    version,
    about = "Audit a GitHub repository's project-health signals and file tickets for what is missing"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run every check, print the report and file remediation tickets.
    Audit(AuditArgs),
    /// Run every check and print the report without filing tickets.
    Report(ReportArgs),
    /// List checks, policy and remediation rules in effect.
    Checks,
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Repository to audit, as owner/name.
    pub repo: String,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Repository to audit, as owner/name.
    pub repo: String,
    #[arg(long)]
    pub markdown: bool,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    crate::logs::init(cli.verbose, cli.quiet);

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::platform::effective_home_dir()?;

    let env_config_path = std::env::var_os("REPOHEALTH_CONFIG").map(std::path::PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match &cli.command {
        Commands::Audit(args) => {
            let client = connect(&cli, &cfg, &ui_cfg, &args.repo)?;
            let mut report = run_audit(&cli, &cfg, &ui_cfg, &client)?;
            if !cli.json {
                crate::ui::print_report(&report, &ui_cfg);
            }
            crate::remediate::file_tickets(&client, &mut report.tickets, cli.dry_run, |ticket| {
                if !cli.json {
                    crate::ui::print_ticket_outcome(ticket, &ui_cfg);
                }
            });
            if cli.json {
                write_json(&report)?;
            }
        }
        Commands::Report(args) => {
            let client = connect(&cli, &cfg, &ui_cfg, &args.repo)?;
            let report = run_audit(&cli, &cfg, &ui_cfg, &client)?;
            if cli.json {
                write_json(&report)?;
            } else if args.markdown {
                write_stdout(&crate::ui::format_markdown_report(&report))?;
            } else {
                crate::ui::print_report(&report, &ui_cfg);
            }
        }
        Commands::Checks => {
            let rules = cfg.remediation.active_rules();
            if cli.json {
                write_json(&serde_json::json!({
                    "checks": crate::core::CheckId::ALL,
                    "policy": &cfg.policy,
                    "rules": rules,
                }))?;
            } else {
                crate::ui::print_checks(&cfg.policy, &rules, &ui_cfg);
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "repohealth", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: use `repohealth config --show`");
            }
        }
    }

    Ok(())
}

fn connect(
    cli: &Cli,
    cfg: &EffectiveConfig,
    ui_cfg: &UiConfig,
    repo: &str,
) -> Result<GithubClient> {
    let repo: RepoName = repo.parse().map_err(crate::exit::invalid_args)?;
    if cli.timeout == 0 {
        return Err(crate::exit::invalid_args(
            "--timeout must be greater than 0",
        ));
    }

    let token = match crate::platform::token_from_env() {
        Some(token) => token,
        None if ui_cfg.stdin_is_tty && ui_cfg.stdout_is_tty => crate::platform::prompt_token()?
            .ok_or_else(|| crate::exit::invalid_args("no access token entered"))?,
        None => {
            return Err(crate::exit::invalid_args(format!(
                "no access token: set {} (or run in a terminal to be prompted)",
                crate::platform::TOKEN_ENV_VARS.join(" or ")
            )));
        }
    };

    GithubClient::new(
        ClientOptions {
            base_url: cfg.api.base_url.clone(),
            user_agent: cfg.api.user_agent.clone(),
            timeout: Duration::from_secs(cli.timeout),
            token,
        },
        repo,
    )
    .map_err(crate::exit::invalid_args_err)
}

fn run_audit(
    cli: &Cli,
    cfg: &EffectiveConfig,
    ui_cfg: &UiConfig,
    client: &GithubClient,
) -> Result<AuditReport> {
    let auditor = Auditor::new(
        client,
        AuditOptions {
            policy: cfg.policy.clone(),
            rules: cfg.remediation.active_rules(),
            show_progress: ui_cfg.stderr_is_tty && !cli.quiet && !cli.json,
        },
    );
    auditor.audit().map_err(crate::exit::remote_err)
}

fn write_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut buf = serde_json::to_vec_pretty(value)?;
    buf.push(b'\n');
    write_stdout_bytes(&buf)
}

fn write_stdout(s: &str) -> Result<()> {
    write_stdout_bytes(s.as_bytes())
}

fn write_stdout_bytes(buf: &[u8]) -> Result<()> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(buf) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}
