use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::pkg::internal::lifecycle::{DbJobStatus, JobStatus, get_job_status};

pub(crate) const JOB_POST_COLUMNS: &str = "id, employer_id, title, description, skills, salary_min, salary_max, vacancy, job_status, deleted, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JobPostEntry {
    pub id: i32,
    pub employer_id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub vacancy: i32,
    pub job_status: DbJobStatus,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobPostEntry {
    pub fn display_status(&self) -> JobStatus {
        get_job_status(Some(self.job_status), self.deleted)
    }
}

/// Attributes of a post that the lifecycle never looks at.
#[derive(Debug, Clone, Default)]
pub struct JobPostData {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub vacancy: i32,
}

#[derive(Debug, Clone, Default)]
pub struct JobPostPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills: Option<Vec<String>>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub vacancy: Option<i32>,
}
