use serde::{Deserialize, Serialize};

use crate::models::saved_job::SavedJob;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Option<String>,
    #[serde(default)]
    pub saved_jobs: Vec<SavedJob>,
}

impl CurrentUser {
    pub fn is_employer(&self) -> bool {
        self.role.as_deref() == Some("employer")
    }

    pub fn saved_job_ids(&self) -> impl Iterator<Item = &str> {
        self.saved_jobs.iter().filter_map(SavedJob::job_id)
    }
}
