use sqlx::PgConnection;

use crate::pkg::internal::adaptors::jobs::spec::{
    JOB_POST_COLUMNS, JobPostData, JobPostEntry, JobPostPatch,
};
use crate::pkg::internal::lifecycle::DbJobStatus;
use crate::prelude::Result;

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    /// New posts always start out PENDING and not deleted.
    pub async fn create(&mut self, employer_id: &str, job: &JobPostData) -> Result<JobPostEntry> {
        let row = sqlx::query_as::<_, JobPostEntry>(&format!(
            r#"
            INSERT INTO job_posts (employer_id, title, description, skills, salary_min, salary_max, vacancy, job_status, deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE)
            RETURNING {JOB_POST_COLUMNS}
            "#
        ))
        .bind(employer_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.skills)
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.vacancy)
        .bind(DbJobStatus::Pending)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&mut self, id: i32, job: JobPostPatch) -> Result<Option<JobPostEntry>> {
        let mut query = String::from("UPDATE job_posts SET updated_at = CURRENT_TIMESTAMP");
        let mut param_count = 1;

        if job.title.is_some() {
            param_count += 1;
            query.push_str(&format!(", title = ${}", param_count));
        }
        if job.description.is_some() {
            param_count += 1;
            query.push_str(&format!(", description = ${}", param_count));
        }
        if job.skills.is_some() {
            param_count += 1;
            query.push_str(&format!(", skills = ${}", param_count));
        }
        if job.salary_min.is_some() {
            param_count += 1;
            query.push_str(&format!(", salary_min = ${}", param_count));
        }
        if job.salary_max.is_some() {
            param_count += 1;
            query.push_str(&format!(", salary_max = ${}", param_count));
        }
        if job.vacancy.is_some() {
            param_count += 1;
            query.push_str(&format!(", vacancy = ${}", param_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND NOT deleted RETURNING {JOB_POST_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, JobPostEntry>(&query).bind(id);

        if let Some(title) = job.title {
            q = q.bind(title);
        }
        if let Some(description) = job.description {
            q = q.bind(description);
        }
        if let Some(skills) = job.skills {
            q = q.bind(skills);
        }
        if let Some(salary_min) = job.salary_min {
            q = q.bind(salary_min);
        }
        if let Some(salary_max) = job.salary_max {
            q = q.bind(salary_max);
        }
        if let Some(vacancy) = job.vacancy {
            q = q.bind(vacancy);
        }
        let row = q.fetch_optional(&mut *self.pool).await?;
        Ok(row)
    }

    pub async fn set_status(
        &mut self,
        id: i32,
        status: DbJobStatus,
    ) -> Result<Option<JobPostEntry>> {
        let row = sqlx::query_as::<_, JobPostEntry>(&format!(
            r#"
            UPDATE job_posts SET job_status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND NOT deleted
            RETURNING {JOB_POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn soft_delete(&mut self, id: i32) -> Result<Option<JobPostEntry>> {
        let row = sqlx::query_as::<_, JobPostEntry>(&format!(
            r#"
            UPDATE job_posts SET deleted = TRUE, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING {JOB_POST_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Copies the attributes of `source` into a fresh PENDING post owned by the
    /// same employer.
    pub async fn clone_from(&mut self, source: &JobPostEntry) -> Result<JobPostEntry> {
        let data = JobPostData {
            title: source.title.clone(),
            description: source.description.clone(),
            skills: source.skills.clone(),
            salary_min: source.salary_min,
            salary_max: source.salary_max,
            vacancy: source.vacancy,
        };
        self.create(&source.employer_id, &data).await
    }
}
