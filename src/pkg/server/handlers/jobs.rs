use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use standard_error::{Interpolate, StandardError, Status};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::{mutators::ApplicationMutator, spec::ApplicationEntry},
                jobs::{
                    mutators::JobMutator,
                    selectors::JobSelector,
                    spec::{JobPostData, JobPostEntry, JobPostPatch},
                },
            },
            auth::Caller,
            guard::{self, Denial, ListScope},
            lifecycle::{JobAction, JobStatus, allowed_actions, parse_action},
        },
        server::state::{AppState, GetTxn},
    },
    prelude::Result,
};

fn default_vacancy() -> i32 {
    1
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobInput {
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0))]
    pub salary_max: Option<i32>,
    #[validate(range(min = 1))]
    #[serde(default = "default_vacancy")]
    pub vacancy: i32,
    /// Only admins post on behalf of an employer.
    pub employer_id: Option<String>,
}

#[derive(Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchJobInput {
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    #[validate(range(min = 0))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 0))]
    pub salary_max: Option<i32>,
    #[validate(range(min = 1))]
    pub vacancy: Option<i32>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct JobPostView {
    #[serde(flatten)]
    pub post: JobPostEntry,
    pub status: JobStatus,
    pub actions: Vec<JobAction>,
}

impl JobPostView {
    pub fn new(caller: &Caller, post: JobPostEntry) -> Self {
        let actions = match caller.role {
            Some(role) => allowed_actions(role, post.job_status, post.deleted)
                .into_iter()
                .filter(|action| guard::authorize(caller, &post, *action).is_ok())
                .collect(),
            None => Vec::new(),
        };
        JobPostView {
            status: post.display_status(),
            post,
            actions,
        }
    }
}

fn invalid_input(detail: String) -> StandardError {
    StandardError::new("ERR-JOB-002")
        .interpolate_err(detail)
        .code(StatusCode::BAD_REQUEST)
}

fn check_salary_range(min: Option<i32>, max: Option<i32>) -> Result<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(invalid_input(format!(
            "salary range {} > {}",
            min, max
        ))),
        _ => Ok(()),
    }
}

/// Loads a post for update, hiding the ones the caller may not see.
async fn load(conn: &mut PgConnection, id: i32, caller: &Caller) -> Result<JobPostEntry> {
    JobSelector::new(conn)
        .lock_by_id(id)
        .await?
        .filter(|post| guard::can_view(caller, post))
        .ok_or_else(|| Denial::NotFound.into_error())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Json(input): Json<CreateJobInput>,
) -> Result<(StatusCode, Json<JobPostView>)> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;
    check_salary_range(input.salary_min, input.salary_max)?;
    let employer_id = guard::create_owner(&caller, input.employer_id.as_deref())
        .map_err(Denial::into_error)?;

    let data = JobPostData {
        title: input.title,
        description: input.description,
        skills: input.skills,
        salary_min: input.salary_min,
        salary_max: input.salary_max,
        vacancy: input.vacancy,
    };
    let mut tx = state.db_pool.begin_txn().await?;
    let post = JobMutator::new(&mut tx).create(&employer_id, &data).await?;
    tx.commit().await?;
    tracing::info!("{} created job {} for {}", caller.user_id, post.id, employer_id);
    Ok((StatusCode::CREATED, Json(JobPostView::new(&caller, post))))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<JobPostView>>> {
    let filter = params
        .status
        .as_deref()
        .map(|s| s.parse::<JobStatus>())
        .transpose()
        .map_err(|e| invalid_input(e.to_string()))?;
    let scope = guard::list_scope(&caller).map_err(Denial::into_error)?;

    let mut conn = state.db_pool.acquire().await?;
    let mut selector = JobSelector::new(&mut conn);
    let posts = match scope {
        ListScope::Active => selector.get_active().await?,
        ListScope::Employer(employer_id) => selector.get_by_employer(&employer_id).await?,
        ListScope::All => selector.get_all().await?,
    };
    let views = posts
        .into_iter()
        .filter(|post| filter.map_or(true, |status| post.display_status() == status))
        .map(|post| JobPostView::new(&caller, post))
        .collect::<Vec<_>>();
    tracing::debug!("{} listed {} jobs", caller.user_id, views.len());
    Ok(Json(views))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path(id): Path<i32>,
) -> Result<Json<JobPostView>> {
    let mut conn = state.db_pool.acquire().await?;
    let post = JobSelector::new(&mut conn)
        .get_by_id(id)
        .await?
        .filter(|post| guard::can_view(&caller, post))
        .ok_or_else(|| Denial::NotFound.into_error())?;
    Ok(Json(JobPostView::new(&caller, post)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path(id): Path<i32>,
    Json(input): Json<PatchJobInput>,
) -> Result<Json<JobPostView>> {
    input.validate().map_err(|e| invalid_input(e.to_string()))?;

    let mut tx = state.db_pool.begin_txn().await?;
    let post = load(&mut tx, id, &caller).await?;
    guard::authorize(&caller, &post, JobAction::Edit).map_err(Denial::into_error)?;
    check_salary_range(
        input.salary_min.or(post.salary_min),
        input.salary_max.or(post.salary_max),
    )?;

    let patch = JobPostPatch {
        title: input.title,
        description: input.description,
        skills: input.skills,
        salary_min: input.salary_min,
        salary_max: input.salary_max,
        vacancy: input.vacancy,
    };
    let updated = JobMutator::new(&mut tx)
        .update(id, patch)
        .await?
        .ok_or_else(|| Denial::NotFound.into_error())?;
    tx.commit().await?;
    tracing::info!("{} edited job {}", caller.user_id, id);
    Ok(Json(JobPostView::new(&caller, updated)))
}

pub async fn transition(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path((id, action)): Path<(i32, String)>,
) -> Result<Json<JobPostView>> {
    // an action we do not know is an action nobody may take
    let action = parse_action(&action).ok_or_else(|| {
        tracing::warn!("{} asked for unknown action {}", caller.user_id, action);
        Denial::Forbidden.into_error()
    })?;

    let mut tx = state.db_pool.begin_txn().await?;
    let post = load(&mut tx, id, &caller).await?;
    let target = guard::plan_transition(&caller, &post, action).map_err(Denial::into_error)?;
    let updated = JobMutator::new(&mut tx)
        .set_status(id, target)
        .await?
        .ok_or_else(|| Denial::NotFound.into_error())?;
    tx.commit().await?;
    tracing::info!(
        "{} moved job {} from {} to {} ({})",
        caller.user_id,
        id,
        post.job_status,
        target,
        action
    );
    Ok(Json(JobPostView::new(&caller, updated)))
}

pub async fn clone_post(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<JobPostView>)> {
    let mut tx = state.db_pool.begin_txn().await?;
    let post = load(&mut tx, id, &caller).await?;
    guard::authorize(&caller, &post, JobAction::Clone).map_err(Denial::into_error)?;
    let copy = JobMutator::new(&mut tx).clone_from(&post).await?;
    tx.commit().await?;
    tracing::info!("{} cloned job {} into {}", caller.user_id, id, copy.id);
    Ok((StatusCode::CREATED, Json(JobPostView::new(&caller, copy))))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path(id): Path<i32>,
) -> Result<Json<JobPostView>> {
    let mut tx = state.db_pool.begin_txn().await?;
    let post = load(&mut tx, id, &caller).await?;
    guard::authorize(&caller, &post, JobAction::Delete).map_err(Denial::into_error)?;
    let deleted = JobMutator::new(&mut tx)
        .soft_delete(id)
        .await?
        .ok_or_else(|| Denial::NotFound.into_error())?;
    tx.commit().await?;
    tracing::info!("{} deleted job {}", caller.user_id, id);
    Ok(Json(JobPostView::new(&caller, deleted)))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(caller): Extension<Arc<Caller>>,
    Path(id): Path<i32>,
) -> Result<(StatusCode, Json<ApplicationEntry>)> {
    let mut tx = state.db_pool.begin_txn().await?;
    let post = load(&mut tx, id, &caller).await?;
    guard::authorize(&caller, &post, JobAction::Apply).map_err(Denial::into_error)?;
    let application = ApplicationMutator::new(&mut tx)
        .apply(id, &caller.user_id)
        .await?
        .ok_or_else(|| StandardError::new("ERR-JOB-005").code(StatusCode::CONFLICT))?;
    tx.commit().await?;
    tracing::info!("{} applied to job {}", caller.user_id, id);
    Ok((StatusCode::CREATED, Json(application)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::pkg::internal::lifecycle::{DbJobStatus, JobRole};

    fn post(employer_id: &str, job_status: DbJobStatus, deleted: bool) -> JobPostEntry {
        JobPostEntry {
            id: 3,
            employer_id: employer_id.to_string(),
            title: "Data Engineer".to_string(),
            description: "Pipelines".to_string(),
            skills: vec![],
            salary_min: None,
            salary_max: None,
            vacancy: 1,
            job_status,
            deleted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn view_carries_derived_status_and_caller_actions() {
        let employer = Caller::new("emp-1", Some(JobRole::Employer));
        let view = JobPostView::new(&employer, post("emp-1", DbJobStatus::Active, false));
        assert_eq!(view.status, JobStatus::Active);
        assert_eq!(
            view.actions,
            vec![JobAction::Fulfill, JobAction::Clone, JobAction::Edit]
        );

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["jobStatus"], "ACTIVE");
        assert_eq!(json["employerId"], "emp-1");
        assert_eq!(json["actions"][0], "fulfill");
    }

    #[test]
    fn view_of_foreign_or_deleted_post_offers_nothing() {
        let employer = Caller::new("emp-1", Some(JobRole::Employer));
        let foreign = JobPostView::new(&employer, post("emp-2", DbJobStatus::Active, false));
        assert!(foreign.actions.is_empty());

        let admin = Caller::new("adm-1", Some(JobRole::Admin));
        let gone = JobPostView::new(&admin, post("emp-1", DbJobStatus::Active, true));
        assert_eq!(gone.status, JobStatus::Deleted);
        assert!(gone.actions.is_empty());

        let guest = Caller::new("g-1", None);
        assert!(
            JobPostView::new(&guest, post("emp-1", DbJobStatus::Active, false))
                .actions
                .is_empty()
        );
    }

    #[test]
    fn create_input_defaults_and_validation() {
        let input: CreateJobInput =
            serde_json::from_str(r#"{"title": "QA", "description": "Testing"}"#).unwrap();
        assert_eq!(input.vacancy, 1);
        assert!(input.skills.is_empty());
        assert!(input.validate().is_ok());

        let input: CreateJobInput =
            serde_json::from_str(r#"{"title": "", "description": "Testing", "vacancy": 0}"#)
                .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn patch_input_validation() {
        assert!(PatchJobInput::default().validate().is_ok());
        let input: PatchJobInput = serde_json::from_str(r#"{"vacancy": 0}"#).unwrap();
        assert!(input.validate().is_err());
        let input: PatchJobInput =
            serde_json::from_str(r#"{"salaryMin": 10, "skills": ["rust"]}"#).unwrap();
        assert!(input.validate().is_ok());
    }

    #[test]
    fn salary_range_must_be_ordered() {
        assert!(check_salary_range(Some(10), Some(20)).is_ok());
        assert!(check_salary_range(Some(10), None).is_ok());
        assert!(check_salary_range(None, None).is_ok());
        assert!(check_salary_range(Some(30), Some(20)).is_err());
    }
}
