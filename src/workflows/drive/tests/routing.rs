use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::config::WorkflowConfig;
use crate::workflows::drive::router::{self, RequestActor};
use crate::workflows::drive::validation::messages;
use crate::workflows::drive::{
    drive_router, DriveWorkflowService, MemoryEntityStore, RoundType, UserRole,
};

fn drive_payload(name: &str, offset_days: i64) -> serde_json::Value {
    json!({
        "driveName": name,
        "driveDate": days_from_today(offset_days),
        "technicalRounds": 2,
        "hrIds": [HR.0],
        "panelIds": [PANEL_A.0, PANEL_B.0],
        "mentorIds": [MENTOR.0],
    })
}

#[tokio::test]
async fn requests_without_identity_are_unauthorized() {
    let harness = build_harness();
    let response = drive_router(harness.service.clone())
        .oneshot(api_request("GET", "/api/v1/drives", None, None))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert!(payload["error"].as_str().is_some());
}

#[tokio::test]
async fn create_drive_returns_created_projection() {
    let harness = build_harness();
    let response = drive_router(harness.service.clone())
        .oneshot(api_request(
            "POST",
            "/api/v1/drives",
            Some(admin()),
            Some(drive_payload("Campus Hiring", 4)),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["data"]["driveName"], "Campus Hiring");
    assert_eq!(payload["data"]["driveStatus"], "InProposal");
    assert!(payload["data"]["driveId"].as_i64().is_some());
    assert_eq!(payload["warnings"], json!([]));
}

#[tokio::test]
async fn rejected_commands_list_every_failure() {
    let harness = build_harness();
    let response = drive_router(harness.service.clone())
        .oneshot(api_request(
            "POST",
            "/api/v1/drives",
            Some(staff(HR, UserRole::Hr)),
            Some(drive_payload("Campus Hiring", 4)),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"][0]["message"], messages::ADMIN_ONLY);
    assert!(payload["errors"][0]["field"].is_string());
    assert_eq!(payload["warnings"], json!([]));
}

#[tokio::test]
async fn drive_lookup_through_the_router() {
    let harness = build_harness();
    let drive = create_drive(&harness, "Campus Hiring", days_from_today(3));
    let app = drive_router(harness.service.clone());

    let found = app
        .clone()
        .oneshot(api_request(
            "GET",
            &format!("/api/v1/drives/{}", drive.drive_id),
            Some(staff(PANEL_A, UserRole::Panel)),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["data"]["driveId"], drive.drive_id.0);

    let missing = app
        .oneshot(api_request("GET", "/api/v1/drives/9999", Some(admin()), None))
        .await
        .expect("router responds");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(missing).await;
    assert_eq!(payload["errors"][0]["message"], messages::DRIVE_NOT_FOUND);
}

#[tokio::test]
async fn handler_can_be_called_directly() {
    let harness = build_harness();
    let drive = create_drive(&harness, "Campus Hiring", days_from_today(3));

    let response = router::get_configuration::<MemoryEntityStore, RecordingNotifier>(
        State(harness.service.clone()),
        RequestActor(admin()),
        Path(drive.drive_id.0),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["data"]["driveId"], drive.drive_id.0);
    assert_eq!(payload["data"]["hrConfiguration"]["canViewFeedback"], true);
}

#[tokio::test]
async fn attendance_endpoint_marks_the_candidate() {
    let harness = build_harness();
    let drive_id = started_drive(&harness, "Campus Hiring");

    let response = drive_router(harness.service.clone())
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/drives/{drive_id}/candidates/100/attendance"),
            Some(staff(HR, UserRole::Hr)),
            Some(json!({ "attendanceStatus": "Present" })),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["data"]["attendanceStatus"], "Present");
    assert_eq!(payload["data"]["candidateId"], 100);
}

#[tokio::test]
async fn candidate_removal_route_is_not_shadowed() {
    let harness = build_harness();
    let drive = create_drive(&harness, "Campus Hiring", days_from_today(3));
    add_candidates(&harness, drive.drive_id, &[100, 101]);

    let response = drive_router(harness.service.clone())
        .oneshot(api_request(
            "POST",
            &format!("/api/v1/drives/{}/candidates/remove", drive.drive_id),
            Some(admin()),
            Some(json!({ "candidateIds": [101] })),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let remaining = harness
        .service
        .list_drive_candidates(&Default::default())
        .expect("candidates listed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].candidate_id.0, 100);
}

#[tokio::test]
async fn assigned_candidates_are_scoped_to_the_panel_caller() {
    let harness = build_harness();
    let drive_id = started_drive(&harness, "Campus Hiring");
    let linked = link(&harness.store, drive_id, 101);
    let interviewer = member_id(&harness.store, drive_id, PANEL_B);
    seed_round(&harness.store, linked.id, interviewer, RoundType::Tech1);
    let app = drive_router(harness.service.clone());

    let response = app
        .clone()
        .oneshot(api_request(
            "GET",
            "/api/v1/panel/candidates",
            Some(staff(PANEL_B, UserRole::Panel)),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["data"][0]["candidateId"], 101);
    assert_eq!(payload["data"].as_array().map(Vec::len), Some(1));

    let refused = app
        .oneshot(api_request(
            "GET",
            "/api/v1/panel/candidates",
            Some(admin()),
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(refused.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(refused).await;
    assert_eq!(
        payload["errors"][0]["message"],
        messages::PANEL_ONLY_ASSIGNED_CANDIDATES
    );
}

#[tokio::test]
async fn storage_failures_are_server_errors() {
    let store = Arc::new(OfflineStore {
        inner: seeded_store(),
    });
    let service = DriveWorkflowService::with_clock(
        store,
        Arc::new(RecordingNotifier::default()),
        WorkflowConfig::default(),
        Arc::new(TestClock::on(today())),
    );

    let response = drive_router(Arc::new(service))
        .oneshot(api_request(
            "POST",
            "/api/v1/drives",
            Some(admin()),
            Some(drive_payload("Campus Hiring", 4)),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("database offline")));
}
