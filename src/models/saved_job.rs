use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::{JobPosting, JobRef};
use crate::store::resource::Identified;

/// A bookmark. Its existence is the bookmarked state; it is never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedJob {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub job: Option<JobRef>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedJob {
    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(JobRef::id)
    }

    pub fn job_posting(&self) -> Option<&JobPosting> {
        self.job.as_ref().and_then(JobRef::job)
    }
}

/// Bookmarks are addressed by the job they point at.
impl Identified for SavedJob {
    fn id(&self) -> &str {
        self.job_id().or(self.id.as_deref()).unwrap_or_default()
    }
}
