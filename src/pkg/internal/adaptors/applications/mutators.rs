use sqlx::PgConnection;

use crate::pkg::internal::adaptors::applications::spec::ApplicationEntry;
use crate::prelude::Result;

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    /// Returns `None` when the candidate had already applied.
    pub async fn apply(
        &mut self,
        job_id: i32,
        candidate_id: &str,
    ) -> Result<Option<ApplicationEntry>> {
        let row = sqlx::query_as::<_, ApplicationEntry>(
            r#"
            INSERT INTO job_applications (job_id, candidate_id)
            VALUES ($1, $2)
            ON CONFLICT (job_id, candidate_id) DO NOTHING
            RETURNING job_id, candidate_id, created_at
            "#,
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
