//! Write-path enforcement of the lifecycle rules for a concrete caller and
//! job post.

use axum::http::StatusCode;
use standard_error::{StandardError, Status};

use crate::pkg::internal::{
    adaptors::jobs::spec::JobPostEntry,
    auth::Caller,
    lifecycle::{DbJobStatus, JobAction, JobRole, can_perform_action, is_valid_transition},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotFound,
    Forbidden,
    MissingEmployer,
    NotStatusChange,
    InvalidTransition {
        from: DbJobStatus,
        to: DbJobStatus,
    },
}

impl Denial {
    pub fn into_error(self) -> StandardError {
        match self {
            Denial::NotFound => StandardError::new("ERR-JOB-001").code(StatusCode::NOT_FOUND),
            Denial::MissingEmployer => {
                StandardError::new("ERR-JOB-002").code(StatusCode::BAD_REQUEST)
            }
            Denial::NotStatusChange => {
                StandardError::new("ERR-JOB-006").code(StatusCode::BAD_REQUEST)
            }
            Denial::Forbidden => StandardError::new("ERR-JOB-003").code(StatusCode::FORBIDDEN),
            Denial::InvalidTransition { .. } => {
                StandardError::new("ERR-JOB-004").code(StatusCode::CONFLICT)
            }
        }
    }
}

/// Which posts a caller gets to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    Active,
    Employer(String),
    All,
}

fn owns(caller: &Caller, post: &JobPostEntry) -> bool {
    post.employer_id == caller.user_id
}

pub fn list_scope(caller: &Caller) -> Result<ListScope, Denial> {
    match caller.role {
        Some(JobRole::Candidate) => Ok(ListScope::Active),
        Some(JobRole::Employer) => Ok(ListScope::Employer(caller.user_id.clone())),
        Some(JobRole::Admin) => Ok(ListScope::All),
        None => Err(Denial::Forbidden),
    }
}

pub fn can_view(caller: &Caller, post: &JobPostEntry) -> bool {
    match caller.role {
        Some(JobRole::Candidate) => can_perform_action(
            JobRole::Candidate,
            post.job_status,
            JobAction::View,
            post.deleted,
        ),
        Some(JobRole::Employer) => owns(caller, post) && !post.deleted,
        Some(JobRole::Admin) => true,
        None => false,
    }
}

/// Posts the caller cannot see are reported as missing rather than forbidden.
pub fn authorize(caller: &Caller, post: &JobPostEntry, action: JobAction) -> Result<(), Denial> {
    let role = caller.role.ok_or(Denial::Forbidden)?;
    if role == JobRole::Employer && !owns(caller, post) {
        return Err(Denial::NotFound);
    }
    if !can_perform_action(role, post.job_status, action, post.deleted) {
        tracing::warn!(
            "{} ({}) may not {} job {} in {}",
            caller.user_id,
            role,
            action,
            post.id,
            post.job_status
        );
        return Err(Denial::Forbidden);
    }
    Ok(())
}

/// Both the permission table and the transition rules must agree before a
/// status is written.
pub fn plan_transition(
    caller: &Caller,
    post: &JobPostEntry,
    action: JobAction,
) -> Result<DbJobStatus, Denial> {
    let target = action.target_status().ok_or(Denial::NotStatusChange)?;
    authorize(caller, post, action)?;
    if !is_valid_transition(post.job_status, target, post.deleted) {
        tracing::warn!(
            "{} may not move job {} from {} to {}",
            caller.user_id,
            post.id,
            post.job_status,
            target
        );
        return Err(Denial::InvalidTransition {
            from: post.job_status,
            to: target,
        });
    }
    Ok(target)
}

pub fn create_owner(caller: &Caller, requested: Option<&str>) -> Result<String, Denial> {
    match caller.role {
        Some(JobRole::Employer) => match requested {
            Some(other) if other != caller.user_id => Err(Denial::Forbidden),
            _ => Ok(caller.user_id.clone()),
        },
        Some(JobRole::Admin) => requested
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .ok_or(Denial::MissingEmployer),
        Some(JobRole::Candidate) | None => Err(Denial::Forbidden),
    }
}
