#![allow(clippy::unwrap_used)]
// Controller tests against a wiremock backend.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cybertrap_core::view::ScheduleRow;
use cybertrap_core::{
    ClientConfig, Command, CommandResult, Controller, CoreError, EntityId, LoadState,
    NotificationLevel, Resource, ScanForm, ScheduleForm, UNKNOWN_DOMAIN, UploadDomainsRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(Url::parse(&server.uri()).unwrap())
        .with_token(SecretString::from("test-token"))
        .with_timeout(Duration::from_secs(5));
    let controller = Controller::new(config).unwrap();
    (server, controller)
}

fn domain_json(id: &str, name: &str, uploaded_at: &str) -> serde_json::Value {
    json!({ "id": id, "domain": name, "uploadedAt": uploaded_at, "ownerId": "u1" })
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_sorts_domains_newest_first() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            domain_json("d1", "old.com", "2024-01-01T00:00:00Z"),
            { "id": "d0", "domain": "undated.com" },
            domain_json("d2", "new.com", "2024-06-01T00:00:00Z"),
        ])))
        .mount(&server)
        .await;

    controller.refresh(Resource::Domains).await.unwrap();

    let names: Vec<String> = controller
        .store()
        .domains_snapshot()
        .iter()
        .map(|d| d.name.clone())
        .collect();
    assert_eq!(names, vec!["new.com", "old.com", "undated.com"]);
    assert_eq!(
        controller.store().load_state(Resource::Domains),
        LoadState::Loaded
    );
}

#[tokio::test]
async fn test_failed_domain_fetch_falls_back_to_unknown_domain() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "domainId": "d1", "templateIds": ["t1"],
              "scheduledDate": "2030-01-15", "scanAll": false },
            { "id": "s2", "domainId": "", "templateIds": [],
              "scheduledDate": "2030-01-16", "scanAll": true },
        ])))
        .mount(&server)
        .await;

    let (domains, scheduled) = tokio::join!(
        controller.refresh(Resource::Domains),
        controller.refresh(Resource::ScheduledScans),
    );
    assert!(domains.is_err());
    scheduled.unwrap();

    assert!(matches!(
        controller.store().load_state(Resource::Domains),
        LoadState::Failed(_)
    ));

    let rows = ScheduleRow::build(controller.store());
    let labels: Vec<&str> = rows.iter().map(|r| r.domain.as_str()).collect();
    assert_eq!(labels, vec![UNKNOWN_DOMAIN, "All Domains"]);
}

#[tokio::test]
async fn test_cancelled_scope_discards_results() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([domain_json("d1", "a.com", "2024-01-01T00:00:00Z")]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let scope = controller.scope();
    let token = scope.token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let outcome = controller.refresh_in(&scope, Resource::Domains).await;
    assert!(outcome.is_none());
    assert!(controller.store().domains_snapshot().is_empty());
    assert_eq!(
        controller.store().load_state(Resource::Domains),
        LoadState::Idle
    );
}

#[tokio::test]
async fn test_late_cancel_keeps_newer_refresh_state() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(800)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let old_scope = controller.scope();
    let cancel_old = old_scope.token();
    let old = tokio::spawn({
        let controller = controller.clone();
        async move {
            controller
                .refresh_in(&old_scope, Resource::Domains)
                .await
                .is_none()
        }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let new_scope = controller.scope();
    controller
        .refresh_in(&new_scope, Resource::Domains)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        controller.store().load_state(Resource::Domains),
        LoadState::Loaded
    );

    cancel_old.cancel();
    assert!(old.await.unwrap());
    assert_eq!(
        controller.store().load_state(Resource::Domains),
        LoadState::Loaded
    );
}

#[tokio::test]
async fn test_shutdown_cancels_scopes() {
    let (_server, controller) = setup().await;
    let scope = controller.scope();
    controller.shutdown();
    assert!(scope.is_cancelled());
    assert!(
        controller
            .refresh_in(&scope, Resource::Templates)
            .await
            .is_none()
    );
}

// ── Domains ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_domain_then_list_includes_it() {
    let (server, controller) = setup().await;
    let requested_at = Utc::now();
    let created_at = (requested_at + chrono::Duration::seconds(1)).to_rfc3339();
    let new_id = uuid::Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/v1/domains"))
        .and(body_json(json!({ "domain": "example.com" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(domain_json(&new_id, "example.com", &created_at)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            domain_json("d1", "old.com", "2024-01-01T00:00:00Z"),
            domain_json(&new_id, "example.com", &created_at),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::CreateDomain {
            name: "  Example.com ".into(),
        })
        .await
        .unwrap();
    let CommandResult::Domain(created) = result else {
        panic!("expected a domain result");
    };
    assert_eq!(created.id, EntityId::from(new_id.as_str()));

    let stored = controller
        .store()
        .domain(&EntityId::from(new_id.as_str()))
        .expect("new domain in store after refresh");
    assert_eq!(stored.name, "example.com");
    assert!(stored.uploaded_at.unwrap() >= requested_at);
    assert_eq!(controller.store().domains_snapshot()[0].name, "example.com");
}

#[tokio::test]
async fn test_plain_text_create_reply_counts_as_success() {
    let (server, controller) = setup().await;
    let mut rx = controller.notifications();

    Mock::given(method("POST"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(201).set_body_string("Domain created successfully"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([domain_json(
            "d7",
            "a.com",
            "2024-06-01T00:00:00Z"
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::CreateDomain {
            name: "a.com".into(),
        })
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ok));

    let note = rx.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Success);
    assert_eq!(note.message, "Domain a.com added");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(controller.store().domain(&EntityId::from("d7")).is_some());
}

#[tokio::test]
async fn test_dot_segment_id_is_rejected_before_delete() {
    let (server, controller) = setup().await;
    let mut rx = controller.notifications();

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = controller
        .execute(Command::DeleteDomain {
            id: EntityId::from(".."),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }), "{err:?}");
    assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Failure);
}

#[tokio::test]
async fn test_invalid_domain_name_never_reaches_backend() {
    let (server, controller) = setup().await;
    let mut rx = controller.notifications();

    Mock::given(method("POST"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = controller
        .execute(Command::CreateDomain {
            name: "bad domain".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Failure);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_upload_then_list_shows_each_line() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/domains/upload-txt"))
        .and(body_string_contains("a.com\nb.com"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            domain_json("d1", "a.com", "2024-06-01T00:00:00Z"),
            domain_json("d2", "b.com", "2024-06-01T00:00:01Z"),
        ])))
        .mount(&server)
        .await;

    controller
        .execute(Command::UploadDomains(UploadDomainsRequest {
            file_name: "domains.txt".into(),
            content: b"a.com\nb.com".to_vec(),
        }))
        .await
        .unwrap();

    let mut names = controller.store().domain_names();
    names.sort();
    assert_eq!(names, vec!["a.com", "b.com"]);
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_exactly_one_notification_per_mutation() {
    let (server, controller) = setup().await;
    let mut rx = controller.notifications();

    Mock::given(method("DELETE"))
        .and(path("/v1/domains/d1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/domains/d2"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "domain has scans" })),
        )
        .mount(&server)
        .await;
    // The post-mutation refresh fails; that must not add a notification.
    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    controller
        .execute(Command::DeleteDomain {
            id: EntityId::from("d1"),
        })
        .await
        .unwrap();
    let ok = rx.try_recv().unwrap();
    assert_eq!(ok.level, NotificationLevel::Success);
    assert_eq!(ok.message, "Domain deleted");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

    let err = controller
        .execute(Command::DeleteDomain {
            id: EntityId::from("d2"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Server { status: 409, .. }));
    let failed = rx.try_recv().unwrap();
    assert_eq!(failed.level, NotificationLevel::Failure);
    assert!(failed.message.contains("domain has scans"), "{}", failed.message);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

// ── Scans ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_all_templates_submits_flag_not_ids() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/scans"))
        .and(body_json(json!({
            "domainIds": ["d1"],
            "templateIds": [],
            "scanAllNuclei": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut form = ScanForm::new();
    form.toggle_domain(EntityId::from("d1")).unwrap();
    for t in ["t1", "t2", "t3"] {
        form.toggle_template(EntityId::from(t)).unwrap();
    }
    form.toggle_all_templates().unwrap();

    let submission = form.submission(&[]).unwrap();
    controller
        .execute(Command::StartScan(submission))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_all_domains_scan_posts_names() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            domain_json("d1", "a.com", "2024-06-01T00:00:00Z"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/scans/all"))
        .and(body_json(json!({ "domains": ["a.com"] })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    controller.refresh(Resource::Domains).await.unwrap();

    let mut form = ScanForm::new();
    form.toggle_all_domains();
    let submission = form
        .submission(&controller.store().domain_names())
        .unwrap();
    controller
        .execute(Command::StartScan(submission))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_scan_detail_carries_result_urls() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/scans/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "domainId": "d1",
            "domain": "a.com",
            "templateIds": [],
            "scanDate": "2024-11-14T10:00:00Z",
            "status": "complete",
            "resultUrls": ["https://results/s1/t1.json"]
        })))
        .mount(&server)
        .await;

    let scan = controller.scan_detail(&EntityId::from("s1")).await.unwrap();
    assert!(scan.covers_all_templates());
    assert_eq!(scan.status.as_str(), "completed");
    assert_eq!(
        scan.result_urls,
        Some(vec!["https://results/s1/t1.json".to_owned()])
    );
}

// ── Scheduled scans ─────────────────────────────────────────────────

#[tokio::test]
async fn test_schedule_all_domains_payload() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/scans/schedule"))
        .and(body_json(json!({
            "domainIds": [],
            "templateIds": [],
            "scanAll": true,
            "scheduledDate": "2030-01-15"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "s9", "domainId": "", "templateIds": [],
            "scheduledDate": "2030-01-15", "scanAll": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let mut form = ScheduleForm::new();
    form.toggle_all_domains();
    form.set_date(NaiveDate::from_ymd_opt(2030, 1, 15));

    let result = controller
        .execute(Command::ScheduleScan(form.submission().unwrap()))
        .await
        .unwrap();
    let CommandResult::Scheduled(scheduled) = result else {
        panic!("expected a scheduled scan");
    };
    assert!(scheduled.scan_all);
    assert!(scheduled.domain_id.is_none());
}

#[tokio::test]
async fn test_plain_text_schedule_reply_refreshes_schedule() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/scans/schedule"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Scan scheduled for all domains successfully"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s9", "domainId": "", "templateIds": [],
              "scheduledDate": "2030-01-15", "scanAll": true },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = ScheduleForm::new();
    form.toggle_all_domains();
    form.set_date(NaiveDate::from_ymd_opt(2030, 1, 15));

    let result = controller
        .execute(Command::ScheduleScan(form.submission().unwrap()))
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ok));
    assert!(
        controller
            .store()
            .scheduled_scan(&EntityId::from("s9"))
            .is_some()
    );
}

#[tokio::test]
async fn test_delete_scheduled_scan_removes_exactly_that_id() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/scans/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "domainId": "d1", "templateIds": ["t1"],
              "scheduledDate": "2030-01-15", "scanAll": false },
            { "id": "s2", "domainId": "d2", "templateIds": [],
              "scheduledDate": "2030-01-16", "scanAll": false },
        ])))
        .mount(&server)
        .await;
    controller.refresh(Resource::ScheduledScans).await.unwrap();
    assert_eq!(controller.store().scheduled_scans_snapshot().len(), 2);

    server.reset().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/scans/schedule/s1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/scans/schedule"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s2", "domainId": "d2", "templateIds": [],
              "scheduledDate": "2030-01-16", "scanAll": false },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    controller
        .execute(Command::DeleteScheduledScan {
            id: EntityId::from("s1"),
        })
        .await
        .unwrap();

    let store = controller.store();
    assert!(store.scheduled_scan(&EntityId::from("s1")).is_none());
    assert!(store.scheduled_scan(&EntityId::from("s2")).is_some());
    assert_eq!(store.scheduled_scans_snapshot().len(), 1);
}
