use std::time::Duration;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::checks::{CheckContext, run_check};
use crate::config::Policy;
use crate::core::{AuditReport, CheckId};
use crate::remediate::{RemediationRule, plan_tickets};
use crate::remote::{RemoteApi, RemoteError};

pub const SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone)]
pub struct AuditOptions {
    pub policy: Policy,
    pub rules: Vec<RemediationRule>,
    pub show_progress: bool,
}

pub struct Auditor<'a> {
    api: &'a dyn RemoteApi,
    opts: AuditOptions,
}

impl<'a> Auditor<'a> {
    pub fn new(api: &'a dyn RemoteApi, opts: AuditOptions) -> Self {
        Self { api, opts }
    }

    /// Runs every check in report order and plans remediation tickets.
    ///
    /// Nothing is submitted here; tickets come back in the `planned` state.
    pub fn audit(&self) -> Result<AuditReport, RemoteError> {
        let ctx = CheckContext {
            api: self.api,
            policy: &self.opts.policy,
        };

        use std::io::IsTerminal;
        let progress_enabled = self.opts.show_progress && std::io::stderr().is_terminal();
        let pb = if progress_enabled {
            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        let mut results = Vec::with_capacity(CheckId::ALL.len());
        for id in CheckId::ALL {
            if let Some(pb) = &pb {
                pb.set_message(format!("Checking {}...", id.label()));
            }
            debug!(check = %id, "running check");
            match run_check(&ctx, id) {
                Ok(result) => results.push(result),
                Err(err) => {
                    if let Some(pb) = &pb {
                        pb.finish_and_clear();
                    }
                    return Err(err);
                }
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let tickets = plan_tickets(&results, &self.opts.rules);

        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(AuditReport {
            schema_version: SCHEMA_VERSION.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            repository: self.api.repository().clone(),
            generated_at,
            results,
            tickets,
        })
    }
}
