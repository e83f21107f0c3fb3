//! Filtered projections of a fetched collection.

use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{JobPosting, JobStatus};
use crate::models::saved_job::SavedJob;

/// Items that can be matched against free text and a categorical status.
pub trait Filterable {
    type Status: PartialEq;

    /// `needle` is already lowercased and non-empty.
    fn matches_text(&self, needle: &str) -> bool;

    fn status(&self) -> Option<&Self::Status>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl<S: PartialEq> StatusFilter<S> {
    pub fn accepts(&self, status: Option<&S>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(wanted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<S> {
    pub text: String,
    pub status: StatusFilter<S>,
}

impl<S> Default for Query<S> {
    fn default() -> Self {
        Self {
            text: String::new(),
            status: StatusFilter::All,
        }
    }
}

impl<S> Query<S> {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            status: StatusFilter::All,
        }
    }

    pub fn with_status(mut self, status: S) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && matches!(self.status, StatusFilter::All)
    }
}

pub type ApplicationQuery = Query<ApplicationStatus>;
pub type JobQuery = Query<JobStatus>;

/// Items of `items` satisfying both predicates, in source order.
pub fn derive<'a, T: Filterable>(items: &'a [T], query: &Query<T::Status>) -> Vec<&'a T> {
    let needle = query.text.trim().to_lowercase();
    items
        .iter()
        .filter(|item| needle.is_empty() || item.matches_text(&needle))
        .filter(|item| query.status.accepts(item.status()))
        .collect()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl Filterable for Application {
    type Status = ApplicationStatus;

    fn matches_text(&self, needle: &str) -> bool {
        contains(self.applicant_name(), needle)
            || contains(self.applicant_email(), needle)
            || self
                .cover_letter
                .as_deref()
                .is_some_and(|letter| contains(letter, needle))
    }

    fn status(&self) -> Option<&ApplicationStatus> {
        Some(&self.status)
    }
}

impl Filterable for JobPosting {
    type Status = JobStatus;

    fn matches_text(&self, needle: &str) -> bool {
        contains(&self.title, needle)
            || contains(&self.location, needle)
            || self.company_name().is_some_and(|c| contains(c, needle))
            || self.skills.iter().any(|skill| contains(skill, needle))
    }

    fn status(&self) -> Option<&JobStatus> {
        self.status.as_ref()
    }
}

impl Filterable for SavedJob {
    type Status = JobStatus;

    fn matches_text(&self, needle: &str) -> bool {
        self.job_posting().is_some_and(|job| job.matches_text(needle))
    }

    fn status(&self) -> Option<&JobStatus> {
        self.job_posting().and_then(|job| job.status.as_ref())
    }
}
