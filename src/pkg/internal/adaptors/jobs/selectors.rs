use sqlx::PgConnection;

use crate::pkg::internal::adaptors::jobs::spec::{JOB_POST_COLUMNS, JobPostEntry};
use crate::pkg::internal::lifecycle::DbJobStatus;
use crate::prelude::Result;

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn get_by_id(&mut self, id: i32) -> Result<Option<JobPostEntry>> {
        let row = sqlx::query_as::<_, JobPostEntry>(&format!(
            "SELECT {JOB_POST_COLUMNS} FROM job_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }

    /// Row-locks the post for the rest of the surrounding transaction.
    pub async fn lock_by_id(&mut self, id: i32) -> Result<Option<JobPostEntry>> {
        let row = sqlx::query_as::<_, JobPostEntry>(&format!(
            "SELECT {JOB_POST_COLUMNS} FROM job_posts WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_all(&mut self) -> Result<Vec<JobPostEntry>> {
        let rows = sqlx::query_as::<_, JobPostEntry>(&format!(
            "SELECT {JOB_POST_COLUMNS} FROM job_posts ORDER BY created_at DESC"
        ))
        .fetch_all(&mut *self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_by_employer(&mut self, employer_id: &str) -> Result<Vec<JobPostEntry>> {
        let rows = sqlx::query_as::<_, JobPostEntry>(&format!(
            "SELECT {JOB_POST_COLUMNS} FROM job_posts
             WHERE employer_id = $1 AND NOT deleted ORDER BY created_at DESC"
        ))
        .bind(employer_id)
        .fetch_all(&mut *self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_active(&mut self) -> Result<Vec<JobPostEntry>> {
        let rows = sqlx::query_as::<_, JobPostEntry>(&format!(
            "SELECT {JOB_POST_COLUMNS} FROM job_posts
             WHERE job_status = $1 AND NOT deleted ORDER BY created_at DESC"
        ))
        .bind(DbJobStatus::Active)
        .fetch_all(&mut *self.pool)
        .await?;

        Ok(rows)
    }
}
