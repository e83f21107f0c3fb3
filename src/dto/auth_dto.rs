use serde::Deserialize;

use crate::models::saved_job::SavedJob;
use crate::models::user::CurrentUser;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserResponse {
    pub user: CurrentUser,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJobsResponse {
    #[serde(default)]
    pub saved_jobs: Vec<SavedJob>,
}
