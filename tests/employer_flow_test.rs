use jobboard_client::config::Config;
use jobboard_client::error::ErrorKind;
use jobboard_client::models::application::ApplicationStatus;
use jobboard_client::services::document_service::{OpenOutcome, ViewerStatus};
use jobboard_client::services::employer_service::applications_error_message;
use jobboard_client::store::derived::{ApplicationQuery, JobQuery};
use jobboard_client::Session;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value as JsonValue};

fn application(id: &str, name: &str, email: &str, status: &str) -> JsonValue {
    json!({
        "_id": id,
        "job": "job1",
        "applicant": {"_id": format!("u-{}", id), "name": name, "email": email},
        "coverLetter": format!("Hello, I am {}", name),
        "resume": {"fileName": format!("{}.pdf", id), "filePath": format!("uploads/{}.pdf", id)},
        "appliedAt": "2025-03-01T10:00:00Z",
        "status": status
    })
}

/// Signed-in employer session. The returned mocks must stay alive for the test.
async fn employer_session(server: &mut ServerGuard) -> (Session, Vec<Mock>) {
    let current_user = server
        .mock("GET", "/auth/current-user")
        .match_header("authorization", "Bearer employer-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"user": {
                "_id": "emp1",
                "name": "Acme HR",
                "email": "hr@acme.test",
                "role": "employer",
                "savedJobs": []
            }})
            .to_string(),
        )
        .create_async()
        .await;
    let notifications = server
        .mock("GET", "/notifications")
        .with_status(200)
        .with_body(json!({"notifications": []}).to_string())
        .create_async()
        .await;

    let config = Config::new(server.url()).with_token("employer-token");
    let session = Session::new(config).expect("session");
    let user = session.start().await.expect("start").expect("signed in");
    assert!(user.is_employer());
    (session, vec![current_user, notifications])
}

async fn mock_applications(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/applications/job/job1")
        .match_query(Matcher::UrlEncoded("employerId".into(), "emp1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"applications": [
                application("app1", "Alice Smith", "alice@mail.test", "applied"),
                application("app2", "Bob Stone", "bob@mail.test", "applied"),
                application("app3", "Carol White", "carol@mail.test", "viewed")
            ]})
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn employer_lists_own_jobs_and_filters_them() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let jobs = server
        .mock("GET", "/jobs")
        .match_query(Matcher::UrlEncoded("employerEmail".into(), "hr@acme.test".into()))
        .with_status(200)
        .with_body(
            json!({"jobs": [
                {"_id": "job1", "title": "Senior Engineer", "location": "Remote", "status": "approved"},
                {"_id": "job2", "title": "Junior Designer", "location": "Berlin", "status": "pending"},
                {"_id": "job3", "title": "Product Manager", "location": "Austin", "status": "approved"}
            ]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.load_jobs().await.unwrap();
    jobs.assert_async().await;

    let senior = review.visible_jobs(&JobQuery::text("senior"));
    assert_eq!(senior.len(), 1);
    assert_eq!(senior[0].title, "Senior Engineer");
    assert_eq!(review.visible_jobs(&JobQuery::default()).len(), 3);
}

#[tokio::test]
async fn status_update_changes_only_the_target_application() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let update = server
        .mock("PUT", "/applications/status/app2")
        .match_body(Matcher::Json(json!({"status": "shortlisted"})))
        .with_status(200)
        .with_body(
            json!({"application": application("app2", "Bob Stone", "bob@mail.test", "shortlisted")})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    assert_eq!(review.selected_job_id().as_deref(), Some("job1"));

    let updated = review
        .update_status("app2", ApplicationStatus::Shortlisted)
        .await
        .unwrap()
        .unwrap();
    update.assert_async().await;
    assert_eq!(updated.status, ApplicationStatus::Shortlisted);

    let statuses: Vec<_> = review
        .applications()
        .items()
        .into_iter()
        .map(|a| (a.id, a.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("app1".to_string(), ApplicationStatus::Applied),
            ("app2".to_string(), ApplicationStatus::Shortlisted),
            ("app3".to_string(), ApplicationStatus::Viewed),
        ]
    );

    let shortlisted =
        review.visible_applications(&ApplicationQuery::default().with_status(ApplicationStatus::Shortlisted));
    assert_eq!(shortlisted.len(), 1);
    assert_eq!(shortlisted[0].id, "app2");
}

#[tokio::test]
async fn status_update_without_echo_refetches_the_list() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let first = mock_applications(&mut server).await;
    let _update = server
        .mock("PUT", "/applications/status/app2")
        .with_status(200)
        .with_body(json!({"message": "Status updated"}).to_string())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    first.remove_async().await;

    let refetch = server
        .mock("GET", "/applications/job/job1")
        .match_query(Matcher::UrlEncoded("employerId".into(), "emp1".into()))
        .with_status(200)
        .with_body(
            json!({"applications": [
                application("app1", "Alice Smith", "alice@mail.test", "applied"),
                application("app2", "Bob Stone", "bob@mail.test", "shortlisted"),
                application("app3", "Carol White", "carol@mail.test", "viewed")
            ]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let updated = review
        .update_status("app2", ApplicationStatus::Shortlisted)
        .await
        .unwrap()
        .expect("application after refetch");
    refetch.assert_async().await;
    assert_eq!(updated.status, ApplicationStatus::Shortlisted);
    assert_eq!(
        review.applications().get("app2").unwrap().status,
        ApplicationStatus::Shortlisted
    );
    assert_eq!(review.applications().len(), 3);
}

#[tokio::test]
async fn server_status_wins_over_the_requested_one() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let _update = server
        .mock("PUT", "/applications/status/app1")
        .match_body(Matcher::Json(json!({"status": "hired"})))
        .with_status(200)
        .with_body(
            json!({"application": application("app1", "Alice Smith", "alice@mail.test", "viewed")})
                .to_string(),
        )
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    let updated = review
        .update_status("app1", ApplicationStatus::Hired)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Viewed);
    assert_eq!(
        review.applications().get("app1").unwrap().status,
        ApplicationStatus::Viewed
    );
    assert!(review
        .visible_applications(&ApplicationQuery::default().with_status(ApplicationStatus::Hired))
        .is_empty());
}

#[tokio::test]
async fn retry_reloads_the_selected_job_after_a_gateway_error() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let down = server
        .mock("GET", "/applications/job/job1")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    let err = review.select_job("job1").await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(
        applications_error_message(&err),
        "Failed to fetch applications. Please try again."
    );
    assert!(review.applications().error().is_some());

    down.remove_async().await;
    let _applications = mock_applications(&mut server).await;
    review.retry().await.unwrap();
    assert_eq!(review.selected_job_id().as_deref(), Some("job1"));
    assert_eq!(review.applications().len(), 3);
    assert!(review.applications().error().is_none());
}

#[tokio::test]
async fn rejected_status_update_leaves_local_state_untouched() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let _mock2 = server
        .mock("PUT", "/applications/status/app1")
        .with_status(422)
        .with_body(json!({"message": "Invalid status transition"}).to_string())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    let err = review
        .update_status("app1", ApplicationStatus::Hired)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationRejected);
    assert!(err.to_string().contains("Invalid status transition"));
    assert_eq!(
        review.applications().get("app1").unwrap().status,
        ApplicationStatus::Applied
    );
}

#[tokio::test]
async fn forbidden_application_list_maps_to_permission_message() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _mock3 = server
        .mock("GET", "/applications/job/job9")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(json!({"message": "Forbidden"}).to_string())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    let err = review.select_job("job9").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    assert_eq!(
        applications_error_message(&err),
        "You don't have permission to view applications for this job."
    );
    assert_eq!(
        review.applications().error().map(|f| f.kind),
        Some(ErrorKind::NotAuthorized)
    );
}

#[tokio::test]
async fn empty_states_distinguish_no_data_from_no_match() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let _mock4 = server
        .mock("GET", "/applications/job/job2")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"applications": []}).to_string())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    assert_eq!(review.empty_message(&ApplicationQuery::default()), None);
    assert_eq!(
        review.empty_message(&ApplicationQuery::text("zebra")),
        Some("No applications match your search criteria.")
    );

    review.select_job("job2").await.unwrap();
    assert_eq!(
        review.empty_message(&ApplicationQuery::default()),
        Some("No applications found for this job.")
    );
}

#[tokio::test]
async fn resume_viewer_uses_server_content_type_and_releases_on_close() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let _mock5 = server
        .mock("GET", "/applications/resume/app1")
        .match_header("authorization", "Bearer employer-token")
        .with_status(200)
        .with_header("content-type", "application/msword")
        .with_body(b"resume-bytes".to_vec())
        .create_async()
        .await;
    let _mock6 = server
        .mock("GET", "/applications/resume/app3")
        .with_status(404)
        .with_body(json!({"message": "Resume not found"}).to_string())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();

    let outcome = review.open_resume("app1").await.unwrap();
    let OpenOutcome::Opened { uri } = outcome else {
        panic!("expected resume to open");
    };
    match review.resume_status() {
        ViewerStatus::Ready {
            resource_id,
            content_type,
            ..
        } => {
            assert_eq!(resource_id, "app1");
            assert_eq!(content_type, "application/msword");
        }
        other => panic!("unexpected viewer state {:?}", other),
    }
    assert_eq!(session.documents.live_count(), 1);

    let dir = tempfile::tempdir().unwrap();
    let saved = review.save_resume(dir.path()).await.unwrap().unwrap();
    assert_eq!(saved, dir.path().join("app1.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"resume-bytes");

    review.close_resume();
    assert_eq!(review.resume_status(), ViewerStatus::Idle);
    assert!(session.documents.resolve_uri(&uri).is_none());
    assert!(review.save_resume(dir.path()).await.unwrap().is_none());

    let err = review.open_resume("app3").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(review.resume_status(), ViewerStatus::Failed { .. }));
    assert!(!review.is_resume_loading("app3"));
    assert_eq!(session.documents.live_count(), 0);
}

#[tokio::test]
async fn cover_letter_view_opens_and_closes() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    let letter = review.open_cover_letter("app3").unwrap();
    assert_eq!(letter.applicant_name, "Carol White");
    assert_eq!(letter.content, "Hello, I am Carol White");
    assert_eq!(review.cover_letter(), Some(letter));

    review.close_cover_letter();
    assert!(review.cover_letter().is_none());
    assert_eq!(
        review.open_cover_letter("missing").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn logout_leaves_the_resume_viewer_idle() {
    let mut server = Server::new_async().await;
    let (session, _mocks) = employer_session(&mut server).await;
    let _applications = mock_applications(&mut server).await;
    let _resume = server
        .mock("GET", "/applications/resume/app2")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(b"%PDF".to_vec())
        .create_async()
        .await;

    let review = session.employer_review().unwrap();
    review.select_job("job1").await.unwrap();
    review.open_resume("app2").await.unwrap();
    assert!(matches!(review.resume_status(), ViewerStatus::Ready { .. }));

    session.logout();
    assert_eq!(session.documents.live_count(), 0);
    assert_eq!(review.resume_status(), ViewerStatus::Idle);
    assert!(review.resume_viewer().document().is_none());
    let dir = tempfile::tempdir().unwrap();
    assert!(review.save_resume(dir.path()).await.unwrap().is_none());
}
