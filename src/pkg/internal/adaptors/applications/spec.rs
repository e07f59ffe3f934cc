use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntry {
    pub job_id: i32,
    pub candidate_id: String,
    pub created_at: DateTime<Utc>,
}
