//! Command line surface of the `jobboard` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jobboard_client::models::application::ApplicationStatus;
use jobboard_client::models::job::JobStatus;

#[derive(Parser)]
#[command(
    name = "jobboard",
    version,
    about = "Browse jobs, bookmarks and applications on a job board API",
    long_about = "Browse jobs, bookmarks and applications on a job board API.\n\n\
                  Reads API_BASE_URL and API_TOKEN from the environment or a .env file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List approved jobs.
    Jobs(JobsArgs),

    /// Add or remove a job from your bookmarks.
    Bookmark {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// List your saved jobs.
    Saved {
        /// Filter by title, location, company or skill.
        #[arg(long)]
        search: Option<String>,
    },

    /// Remove a job from your saved jobs.
    RemoveSaved {
        #[arg(value_name = "JOB_ID")]
        job_id: String,
    },

    /// List the jobs you applied for.
    MyApplications,

    /// Download the resume attached to one of your applications.
    Resume {
        #[arg(value_name = "APPLICATION_ID")]
        application_id: String,

        /// Directory to save into (default: DOWNLOAD_DIR).
        #[arg(long = "out", value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Review applications for your postings.
    #[command(subcommand)]
    Employer(EmployerCommand),

    /// Show your notifications.
    Notifications,

    /// Mark a notification as read.
    MarkRead {
        #[arg(value_name = "NOTIFICATION_ID")]
        notification_id: String,
    },
}

#[derive(Parser)]
pub struct JobsArgs {
    /// Filter by title, location, company or skill.
    #[arg(long)]
    pub search: Option<String>,

    /// Only show jobs in this status.
    #[arg(long, value_name = "STATUS")]
    pub status: Option<JobStatus>,
}

#[derive(Subcommand)]
pub enum EmployerCommand {
    /// List your job postings.
    Jobs {
        #[arg(long)]
        search: Option<String>,
    },

    /// List applications received for one posting.
    Applications(ApplicationsArgs),

    /// Change the status of an application.
    SetStatus {
        #[arg(long = "job", value_name = "JOB_ID")]
        job_id: String,

        #[arg(value_name = "APPLICATION_ID")]
        application_id: String,

        /// applied, viewed, shortlisted, rejected or hired.
        #[arg(value_name = "STATUS")]
        status: ApplicationStatus,
    },

    /// Print an applicant's cover letter.
    CoverLetter {
        #[arg(long = "job", value_name = "JOB_ID")]
        job_id: String,

        #[arg(value_name = "APPLICATION_ID")]
        application_id: String,
    },

    /// Fetch an applicant's resume and save it.
    Resume {
        #[arg(long = "job", value_name = "JOB_ID")]
        job_id: String,

        #[arg(value_name = "APPLICATION_ID")]
        application_id: String,

        #[arg(long = "out", value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[derive(Parser)]
pub struct ApplicationsArgs {
    #[arg(long = "job", value_name = "JOB_ID")]
    pub job_id: String,

    /// Filter by applicant name, email or cover letter.
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_name = "STATUS")]
    pub status: Option<ApplicationStatus>,
}
