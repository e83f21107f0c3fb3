use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::job::{JobPosting, JobRef};
use crate::store::resource::Identified;

pub const UNKNOWN_APPLICANT: &str = "Unknown Applicant";
pub const NO_EMAIL: &str = "No email provided";
pub const NO_COVER_LETTER: &str = "No cover letter provided";
pub const DEFAULT_RESUME_NAME: &str = "resume.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Viewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Viewed => "viewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Viewed => "Viewed",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Hired => "Hired",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == needle)
            .ok_or_else(|| format!("Unknown application status: {}", s))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRef {
    pub file_name: Option<String>,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,
    pub job: Option<JobRef>,
    pub applicant: Option<Applicant>,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumeRef>,
    pub applied_at: Option<DateTime<Utc>>,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

impl Application {
    pub fn applicant_name(&self) -> &str {
        self.applicant
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_APPLICANT)
    }

    pub fn applicant_email(&self) -> &str {
        self.applicant
            .as_ref()
            .and_then(|a| a.email.as_deref())
            .filter(|e| !e.is_empty())
            .unwrap_or(NO_EMAIL)
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job.as_ref().map(JobRef::id)
    }

    pub fn job_posting(&self) -> Option<&JobPosting> {
        self.job.as_ref().and_then(JobRef::job)
    }

    pub fn resume_file_name(&self) -> &str {
        self.resume
            .as_ref()
            .and_then(|r| r.file_name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_RESUME_NAME)
    }

    pub fn cover_letter_view(&self) -> CoverLetterView {
        CoverLetterView {
            applicant_name: self.applicant_name().to_string(),
            content: self
                .cover_letter
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(NO_COVER_LETTER)
                .to_string(),
        }
    }
}

impl Identified for Application {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only secondary view of an application's cover letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterView {
    pub applicant_name: String,
    pub content: String,
}
