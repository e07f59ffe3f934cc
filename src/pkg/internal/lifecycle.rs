//! Job post lifecycle: status projection, transition rules and the
//! role/action permission table.
//!
//! Everything here is pure and total. Unknown input never errors, it degrades
//! to `pending` or to a denied verdict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Persisted lifecycle state of a job post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "job_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DbJobStatus {
    Pending,
    OnHold,
    Active,
    Fulfilled,
    Dormant,
}

/// Display status, derived from `(job_status, deleted)`. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    Active,
    Pending,
    OnHold,
    Dormant,
    Fulfilled,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobRole {
    Candidate,
    Employer,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Fulfill,
    Activate,
    Deactivate,
    Hold,
    Clone,
    Delete,
    Edit,
    View,
    Apply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

const TRANSITIONS: &[(DbJobStatus, &[DbJobStatus])] = &[
    (DbJobStatus::Pending, &[DbJobStatus::OnHold, DbJobStatus::Active]),
    (DbJobStatus::OnHold, &[DbJobStatus::Active]),
    (DbJobStatus::Active, &[DbJobStatus::Dormant, DbJobStatus::Fulfilled]),
    (DbJobStatus::Dormant, &[DbJobStatus::Active]),
    (DbJobStatus::Fulfilled, &[]),
];

const EMPLOYER_PERMISSIONS: &[(DbJobStatus, &[JobAction])] = &[
    (DbJobStatus::Pending, &[JobAction::Clone, JobAction::Edit]),
    (DbJobStatus::OnHold, &[JobAction::Clone, JobAction::Edit]),
    (DbJobStatus::Dormant, &[JobAction::Clone, JobAction::Activate]),
    (
        DbJobStatus::Active,
        &[JobAction::Clone, JobAction::Edit, JobAction::Fulfill],
    ),
    (DbJobStatus::Fulfilled, &[JobAction::Clone]),
];

const ADMIN_PERMISSIONS: &[(DbJobStatus, &[JobAction])] = &[
    (
        DbJobStatus::Pending,
        &[
            JobAction::Delete,
            JobAction::Clone,
            JobAction::Edit,
            JobAction::Activate,
            JobAction::Hold,
        ],
    ),
    (
        DbJobStatus::OnHold,
        &[
            JobAction::Delete,
            JobAction::Clone,
            JobAction::Edit,
            JobAction::Activate,
        ],
    ),
    (
        DbJobStatus::Active,
        &[
            JobAction::Delete,
            JobAction::Clone,
            JobAction::Edit,
            JobAction::Fulfill,
        ],
    ),
    (
        DbJobStatus::Dormant,
        &[JobAction::Delete, JobAction::Clone, JobAction::Activate],
    ),
    (
        DbJobStatus::Fulfilled,
        &[JobAction::Delete, JobAction::Clone, JobAction::Activate],
    ),
];

fn lookup<K: PartialEq + Copy, V>(table: &'static [(K, &'static [V])], key: K) -> &'static [V] {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(&[])
}

/// Projects the persisted fields onto the display status. `deleted` wins over
/// everything; a missing status reads as pending.
pub fn get_job_status(job_status: Option<DbJobStatus>, deleted: bool) -> JobStatus {
    if deleted {
        return JobStatus::Deleted;
    }
    match job_status {
        Some(DbJobStatus::Active) => JobStatus::Active,
        Some(DbJobStatus::OnHold) => JobStatus::OnHold,
        Some(DbJobStatus::Fulfilled) => JobStatus::Fulfilled,
        Some(DbJobStatus::Dormant) => JobStatus::Dormant,
        Some(DbJobStatus::Pending) | None => JobStatus::Pending,
    }
}

pub fn is_valid_transition(current: DbJobStatus, target: DbJobStatus, deleted: bool) -> bool {
    if deleted {
        return false;
    }
    if current == target {
        return true;
    }
    lookup(TRANSITIONS, current).contains(&target)
}

pub fn can_perform_action(
    role: JobRole,
    status: DbJobStatus,
    action: JobAction,
    deleted: bool,
) -> bool {
    if deleted {
        return false;
    }
    match role {
        JobRole::Candidate => {
            matches!(action, JobAction::View | JobAction::Apply) && status == DbJobStatus::Active
        }
        JobRole::Employer => lookup(EMPLOYER_PERMISSIONS, status).contains(&action),
        JobRole::Admin => lookup(ADMIN_PERMISSIONS, status).contains(&action),
    }
}

/// Every action `role` may take on a post in `status`, in `JobAction::ALL` order.
pub fn allowed_actions(role: JobRole, status: DbJobStatus, deleted: bool) -> Vec<JobAction> {
    JobAction::ALL
        .into_iter()
        .filter(|action| can_perform_action(role, status, *action, deleted))
        .collect()
}

// Untyped input is matched exactly against the wire spelling; anything else
// names no variant.

pub fn parse_status(s: &str) -> Option<DbJobStatus> {
    s.parse().ok()
}

pub fn parse_role(s: &str) -> Option<JobRole> {
    s.parse().ok()
}

pub fn parse_action(s: &str) -> Option<JobAction> {
    s.parse().ok()
}

pub fn get_job_status_str(job_status: Option<&str>, deleted: bool) -> JobStatus {
    get_job_status(job_status.and_then(parse_status), deleted)
}

pub fn is_valid_transition_str(current: &str, target: &str, deleted: bool) -> bool {
    match (parse_status(current), parse_status(target)) {
        (Some(current), Some(target)) => is_valid_transition(current, target, deleted),
        _ => false,
    }
}

pub fn can_perform_action_str(role: &str, status: &str, action: &str, deleted: bool) -> bool {
    match (parse_role(role), parse_status(status), parse_action(action)) {
        (Some(role), Some(status), Some(action)) => {
            can_perform_action(role, status, action, deleted)
        }
        _ => false,
    }
}

impl DbJobStatus {
    pub const ALL: [DbJobStatus; 5] = [
        DbJobStatus::Pending,
        DbJobStatus::OnHold,
        DbJobStatus::Active,
        DbJobStatus::Fulfilled,
        DbJobStatus::Dormant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DbJobStatus::Pending => "PENDING",
            DbJobStatus::OnHold => "ON_HOLD",
            DbJobStatus::Active => "ACTIVE",
            DbJobStatus::Fulfilled => "FULFILLED",
            DbJobStatus::Dormant => "DORMANT",
        }
    }
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Active,
        JobStatus::Pending,
        JobStatus::OnHold,
        JobStatus::Dormant,
        JobStatus::Fulfilled,
        JobStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Pending => "pending",
            JobStatus::OnHold => "onHold",
            JobStatus::Dormant => "dormant",
            JobStatus::Fulfilled => "fulfilled",
            JobStatus::Deleted => "deleted",
        }
    }
}

impl JobRole {
    pub const ALL: [JobRole; 3] = [JobRole::Candidate, JobRole::Employer, JobRole::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobRole::Candidate => "candidate",
            JobRole::Employer => "employer",
            JobRole::Admin => "admin",
        }
    }
}

impl JobAction {
    pub const ALL: [JobAction; 9] = [
        JobAction::Fulfill,
        JobAction::Activate,
        JobAction::Deactivate,
        JobAction::Hold,
        JobAction::Clone,
        JobAction::Delete,
        JobAction::Edit,
        JobAction::View,
        JobAction::Apply,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Fulfill => "fulfill",
            JobAction::Activate => "activate",
            JobAction::Deactivate => "deactivate",
            JobAction::Hold => "hold",
            JobAction::Clone => "clone",
            JobAction::Delete => "delete",
            JobAction::Edit => "edit",
            JobAction::View => "view",
            JobAction::Apply => "apply",
        }
    }

    /// The status a status-changing action writes, `None` for the rest.
    pub fn target_status(&self) -> Option<DbJobStatus> {
        match self {
            JobAction::Fulfill => Some(DbJobStatus::Fulfilled),
            JobAction::Activate => Some(DbJobStatus::Active),
            JobAction::Deactivate => Some(DbJobStatus::Dormant),
            JobAction::Hold => Some(DbJobStatus::OnHold),
            _ => None,
        }
    }
}

macro_rules! str_conversions {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant(s.to_string()))
            }
        }
    )*};
}

str_conversions!(DbJobStatus, JobStatus, JobRole, JobAction);
