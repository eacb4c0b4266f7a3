//! Issue lifecycle: status and severity enumerations plus transition rules.
//!
//! The canonical display strings ("Pending", "In Progress", ...) are both
//! the wire format and the stored column values; the CHECK constraints in
//! the issues migration must list exactly these strings.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Rejected,
}

impl IssueStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Rejected,
    ];

    /// Canonical display string, as stored and serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Rejected => "Rejected",
        }
    }

    /// Resolved and Rejected close the lifecycle; no transition leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Resolved | IssueStatus::Rejected)
    }

    /// Sort rank for technician worklists: actionable work first.
    pub fn worklist_rank(self) -> i32 {
        match self {
            IssueStatus::Pending => 1,
            IssueStatus::InProgress => 2,
            IssueStatus::Resolved => 3,
            IssueStatus::Rejected => 4,
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: Pending, In Progress, Resolved, Rejected"
                ))
            })
    }
}

impl TryFrom<String> for IssueStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Severity tier assigned by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

impl Severity {
    /// All severities, most urgent first. Triage queues render in this order.
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Moderate, Severity::Minor];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Moderate => "Moderate",
            Severity::Minor => "Minor",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::ALL
            .into_iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid severity '{s}'. Must be one of: Critical, Moderate, Minor"
                ))
            })
    }
}

impl TryFrom<String> for Severity {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Gate a status change. Terminal states admit no further transitions;
/// from anything else, staff may set any status (permissive triage model,
/// including re-setting the current status to attach a new comment).
pub fn ensure_transition(current: IssueStatus, next: IssueStatus) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Issue is {current} and cannot move to {next}"
        )));
    }
    Ok(())
}
