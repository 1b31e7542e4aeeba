mod check;
mod repo;
mod report;
mod ticket;

pub use check::{CheckId, CheckResult, CheckStatus};
pub use repo::RepoName;
pub use report::AuditReport;
pub use ticket::{RemediationTicket, TicketState};
