use anyhow::Error;
use std::fmt::Write as _;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::config::Policy;
use crate::core::{AuditReport, CheckId, CheckStatus, RemediationTicket, TicketState};
use crate::remediate::RemediationRule;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(
        stderr,
        "  - re-run with `--verbose` for request-level diagnostics"
    );
    let _ = writeln!(
        stderr,
        "  - see `repohealth --help` for available commands and options"
    );
}

pub fn print_report(report: &AuditReport, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = out.write_all(format_text_report(report, cfg.color, cfg.verbose).as_bytes());
}

pub fn format_text_report(report: &AuditReport, color: bool, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Repository Analysis Report for {}:",
        report.repository
    );
    for (idx, result) in report.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {}",
            idx + 1,
            result.check.label(),
            paint(&result.message, result.status, color)
        );
        if verbose && result.details.len() > 1 {
            for detail in &result.details {
                let _ = writeln!(out, "   - {detail}");
            }
        }
    }

    if !report.tickets.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Remediation ({} tickets):", report.tickets.len());
        for ticket in &report.tickets {
            let _ = writeln!(out, "- {} [{}]", ticket.title, ticket.rule);
        }
    }
    out
}

pub fn print_ticket_outcome(ticket: &RemediationTicket, cfg: &UiConfig) {
    match ticket.state {
        TicketState::Created => {
            if !cfg.quiet {
                println!("Issue created: {}", ticket.title);
            }
        }
        TicketState::Failed => {
            eprintln!(
                "Failed to create issue: {}: {}",
                ticket.title,
                ticket.error.as_deref().unwrap_or("unknown error")
            );
        }
        TicketState::Skipped => {
            if !cfg.quiet {
                println!("dry-run: would create issue: {}", ticket.title);
            }
        }
        TicketState::Planned => {}
    }
}

pub fn print_checks(policy: &Policy, rules: &[RemediationRule], cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();

    let _ = writeln!(out, "Checks (in report order):");
    for (idx, id) in CheckId::ALL.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {:<24} {}", idx + 1, id.as_str(), id.label());
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Policy:");
    let _ = writeln!(
        out,
        "- README sections: {}",
        policy.readme_sections.join(", ")
    );
    let _ = writeln!(out, "- manifests: {}", policy.manifests.join(", "));
    let _ = writeln!(out, "- resolved keyword: {}", policy.resolved_keyword);
    let _ = writeln!(out, "- addressed keyword: {}", policy.addressed_keyword);

    let _ = writeln!(out);
    if rules.is_empty() {
        let _ = writeln!(out, "Remediation rules: none (remediation disabled)");
        return;
    }
    let _ = writeln!(out, "Remediation rules (in submission order):");
    let name_w = rules
        .iter()
        .map(|r| r.name.width())
        .max()
        .unwrap_or(0)
        .max("name".width());
    let check_w = rules
        .iter()
        .map(|r| r.check.as_str().width())
        .max()
        .unwrap_or(0)
        .max("check".width());
    let _ = writeln!(
        out,
        "{}  {}  {}",
        pad_end_display("name", name_w),
        pad_end_display("check", check_w),
        "match -> title"
    );
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(name_w),
        "-".repeat(check_w),
        "-".repeat(14)
    );
    for rule in rules {
        let _ = writeln!(
            out,
            "{}  {}  \"{}\" -> {}",
            pad_end_display(&rule.name, name_w),
            pad_end_display(rule.check.as_str(), check_w),
            rule.contains,
            rule.title
        );
    }
}

pub fn format_markdown_report(report: &AuditReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Repository health: {}", report.repository);
    let _ = writeln!(out);
    let _ = writeln!(out, "- tool version: {}", report.tool_version);
    let _ = writeln!(out, "- generated at: {}", report.generated_at);

    let _ = writeln!(out);
    let _ = writeln!(out, "## Checks ({})", report.results.len());
    let _ = writeln!(out);
    let _ = writeln!(out, "| # | Check | Status | Result |");
    let _ = writeln!(out, "|---|---|---|---|");
    for (idx, result) in report.results.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            idx + 1,
            result.check.label(),
            result.status,
            escape_table_cell(&result.message)
        );
    }

    for result in report.results.iter().filter(|r| r.details.len() > 1) {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", result.check.label());
        let _ = writeln!(out);
        for detail in &result.details {
            let _ = writeln!(out, "- {detail}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Remediation ({})", report.tickets.len());
    if report.tickets.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "_No tickets to file._");
    }
    for ticket in &report.tickets {
        let _ = writeln!(out);
        let _ = writeln!(out, "### {}", ticket.title);
        let _ = writeln!(out, "- rule: `{}`", ticket.rule);
        let _ = writeln!(out, "- check: `{}`", ticket.check);
        let _ = writeln!(out);
        write_fenced_code_block(&mut out, "", "text", &ticket.body);
    }

    let _ = writeln!(out);
    out
}

fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn write_fenced_code_block(out: &mut String, indent: &str, lang: &str, content: &str) {
    let _ = writeln!(out, "{indent}```{lang}");
    for line in content.lines() {
        let _ = writeln!(out, "{indent}{line}");
    }
    let _ = writeln!(out, "{indent}```");
}

fn paint(s: &str, status: CheckStatus, color: bool) -> String {
    if !color {
        return s.to_string();
    }

    let code = match status {
        CheckStatus::Pass => "32",
        CheckStatus::Attention | CheckStatus::Incomplete => "33",
        CheckStatus::Missing => "31",
        CheckStatus::Inconclusive => "90",
    };
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = s.width();
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}
