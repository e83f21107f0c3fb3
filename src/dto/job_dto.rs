use serde::{Deserialize, Serialize};

use crate::models::job::{JobPosting, JobStatus};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_email: Option<String>,
}

impl JobListQuery {
    pub fn approved() -> Self {
        Self {
            status: Some(JobStatus::Approved),
            employer_email: None,
        }
    }

    pub fn for_employer(email: impl Into<String>) -> Self {
        Self {
            status: None,
            employer_email: Some(email.into()),
        }
    }

    /// Locator used to key the jobs collection for this query.
    pub fn locator(&self) -> String {
        match (&self.status, &self.employer_email) {
            (Some(status), Some(email)) => format!("jobs?status={}&employerEmail={}", status, email),
            (Some(status), None) => format!("jobs?status={}", status),
            (None, Some(email)) => format!("jobs?employerEmail={}", email),
            (None, None) => "jobs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobListResponse {
    #[serde(default)]
    pub jobs: Vec<JobPosting>,
}
