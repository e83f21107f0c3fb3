use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::resource::Identified;

/// Moderation status of a posting. Only approved postings are listed publicly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Approved,
    Rejected,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Approved => "approved",
            JobStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Approved => "Approved",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "approved" => Ok(JobStatus::Approved),
            "rejected" => Ok(JobStatus::Rejected),
            other => Err(format!("Unknown job status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Company {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employer {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<Company>,
}

/// The API populates `employer` on list endpoints and sends a bare id elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmployerRef {
    Populated(Employer),
    Id(String),
}

impl EmployerRef {
    pub fn employer(&self) -> Option<&Employer> {
        match self {
            EmployerRef::Populated(e) => Some(e),
            EmployerRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Salary {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub employer: Option<EmployerRef>,
    pub company: Option<Company>,
    #[serde(default)]
    pub location: String,
    pub salary: Option<Salary>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<JobStatus>,
}

impl JobPosting {
    pub fn company_name(&self) -> Option<&str> {
        self.employer
            .as_ref()
            .and_then(EmployerRef::employer)
            .and_then(|e| e.company.as_ref())
            .and_then(|c| c.name.as_deref())
            .or_else(|| self.company.as_ref().and_then(|c| c.name.as_deref()))
            .filter(|name| !name.trim().is_empty())
    }

    pub fn employer_name(&self) -> Option<&str> {
        self.employer
            .as_ref()
            .and_then(EmployerRef::employer)
            .and_then(|e| e.name.as_deref())
    }

    /// Postings without a deadline stay open.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.deadline.map_or(true, |deadline| deadline > now)
    }
}

impl Identified for JobPosting {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Reference to a posting that is either populated inline or just its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobRef {
    Populated(Box<JobPosting>),
    Id(String),
}

impl JobRef {
    pub fn id(&self) -> &str {
        match self {
            JobRef::Populated(job) => &job.id,
            JobRef::Id(id) => id,
        }
    }

    pub fn job(&self) -> Option<&JobPosting> {
        match self {
            JobRef::Populated(job) => Some(job),
            JobRef::Id(_) => None,
        }
    }
}
