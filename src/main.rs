use clap::Parser;
use jobboard_client::config::{get_config, init_config};
use jobboard_client::services::document_service::{OpenOutcome, ViewerStatus};
use jobboard_client::services::employer_service::applications_error_message;
use jobboard_client::store::derived::{ApplicationQuery, JobQuery};
use jobboard_client::utils::{format, time};
use jobboard_client::Session;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{ApplicationsArgs, Cli, Command, EmployerCommand, JobsArgs};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    init_config()?;
    let config = get_config()?;
    info!("Using API at {}", config.api_base_url);

    let session = Session::new(config.clone())?;
    session.start().await?;

    let result = run(&session, cli.command).await;
    session.logout();
    result
}

async fn run(session: &Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Jobs(args) => list_jobs(session, args).await,
        Command::Bookmark { job_id } => {
            let saved = session.job_board().toggle_bookmark(&job_id).await?;
            if saved {
                println!("Job {} saved", job_id);
            } else {
                println!("Job {} removed from saved jobs", job_id);
            }
            Ok(())
        }
        Command::Saved { search } => {
            let saved = session.saved_jobs();
            saved.load().await?;
            println!("{}", saved.count_label());
            for entry in saved.visible(&JobQuery::text(search.unwrap_or_default())) {
                if let Some(job) = entry.job_posting() {
                    println!(
                        "{}  {}  {}  {}",
                        job.id,
                        job.title,
                        job.company_name().or(job.employer_name()).unwrap_or("-"),
                        format::format_salary(job.salary.as_ref())
                    );
                }
            }
            Ok(())
        }
        Command::RemoveSaved { job_id } => {
            let saved = session.saved_jobs();
            saved.load().await?;
            saved.remove(&job_id).await?;
            println!("Job {} removed from saved jobs", job_id);
            Ok(())
        }
        Command::MyApplications => {
            let applied = session.applied_jobs();
            applied.load().await?;
            println!("{}", applied.summary());
            for application in applied.applications().items() {
                let title = application
                    .job_posting()
                    .map(|job| job.title.as_str())
                    .unwrap_or("Job no longer available");
                let applied_on = application
                    .applied_at
                    .map(time::format_date)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  applied {}",
                    application.id,
                    title,
                    application.status.label(),
                    applied_on
                );
            }
            Ok(())
        }
        Command::Resume {
            application_id,
            out,
        } => {
            let applied = session.applied_jobs();
            applied.load().await?;
            let dir = out.unwrap_or_else(|| session.config.download_dir.clone());
            let path = applied.download_resume(&application_id, &dir).await?;
            println!("Saved {}", path.display());
            Ok(())
        }
        Command::Employer(command) => employer(session, command).await,
        Command::Notifications => {
            let snapshot = session.notifications.snapshot();
            println!("{} unread", session.notifications.unread_count());
            for notification in snapshot.items {
                let marker = if notification.is_read { " " } else { "*" };
                println!(
                    "{}{} {}  {}",
                    marker,
                    notification.kind.marker(),
                    notification.id,
                    notification.message
                );
            }
            Ok(())
        }
        Command::MarkRead { notification_id } => {
            if session.notifications.mark_read(&notification_id).await? {
                println!("Notification {} marked as read", notification_id);
            } else {
                println!("Notification {} has nothing to mark", notification_id);
            }
            Ok(())
        }
    }
}

async fn list_jobs(session: &Session, args: JobsArgs) -> anyhow::Result<()> {
    let board = session.job_board();
    board.load().await?;

    let mut query = JobQuery::text(args.search.unwrap_or_default());
    if let Some(status) = args.status {
        query = query.with_status(status);
    }
    let now = time::now();
    let jobs = board.visible(&query);
    if jobs.is_empty() {
        println!("No jobs found");
    }
    for job in jobs {
        let bookmark = if board.is_bookmarked(&job.id) { "[saved]" } else { "" };
        println!(
            "{}  {}  {}  {}  {}  {} {}",
            job.id,
            job.title,
            job.company_name().or(job.employer_name()).unwrap_or("-"),
            format::format_job_type(job.job_type.as_deref()),
            format::format_salary(job.salary.as_ref()),
            format::deadline_label(&job, now),
            bookmark
        );
        if !job.skills.is_empty() {
            println!("    {}", format::preview(&job.skills, 4));
        }
    }
    Ok(())
}

async fn employer(session: &Session, command: EmployerCommand) -> anyhow::Result<()> {
    let review = session.employer_review()?;
    match command {
        EmployerCommand::Jobs { search } => {
            review.load_jobs().await?;
            for job in review.visible_jobs(&JobQuery::text(search.unwrap_or_default())) {
                let status = job.status.map(|s| s.label()).unwrap_or("-");
                println!("{}  {}  {}", job.id, job.title, status);
            }
            Ok(())
        }
        EmployerCommand::Applications(ApplicationsArgs {
            job_id,
            search,
            status,
        }) => {
            if let Err(e) = review.select_job(&job_id).await {
                if !e.is_retryable() {
                    anyhow::bail!(applications_error_message(&e));
                }
                warn!("Loading applications failed ({}), retrying once", e);
                if let Err(e) = review.retry().await {
                    anyhow::bail!(applications_error_message(&e));
                }
            }
            let mut query = ApplicationQuery::text(search.unwrap_or_default());
            if let Some(status) = status {
                query = query.with_status(status);
            }
            if let Some(message) = review.empty_message(&query) {
                println!("{}", message);
            }
            for application in review.visible_applications(&query) {
                println!(
                    "{}  {}  {}  {}",
                    application.id,
                    application.applicant_name(),
                    application.applicant_email(),
                    application.status.label()
                );
            }
            Ok(())
        }
        EmployerCommand::SetStatus {
            job_id,
            application_id,
            status,
        } => {
            review.select_job(&job_id).await?;
            match review.update_status(&application_id, status).await? {
                Some(application) => println!(
                    "Application {} is now {}",
                    application.id,
                    application.status.label()
                ),
                None => println!("Status update sent for application {}", application_id),
            }
            Ok(())
        }
        EmployerCommand::CoverLetter {
            job_id,
            application_id,
        } => {
            review.select_job(&job_id).await?;
            let letter = review.open_cover_letter(&application_id)?;
            println!("Cover letter from {}\n\n{}", letter.applicant_name, letter.content);
            review.close_cover_letter();
            Ok(())
        }
        EmployerCommand::Resume {
            job_id,
            application_id,
            out,
        } => {
            review.select_job(&job_id).await?;
            if let OpenOutcome::Opened { uri } = review.open_resume(&application_id).await? {
                if let ViewerStatus::Ready { content_type, .. } = review.resume_status() {
                    info!("Resume {} opened as {} ({})", application_id, uri, content_type);
                }
                let dir = out.unwrap_or_else(|| session.config.download_dir.clone());
                if let Some(path) = review.save_resume(&dir).await? {
                    println!("Saved {}", path.display());
                }
            }
            review.close_resume();
            Ok(())
        }
    }
}
