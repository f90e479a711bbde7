mod common;

use botfleet_core::handlers;
use botfleet_core::service::containers::ContainerService;
use botfleet_error::sync::{codes, SyncError};
use botfleet_models::domain::wire::ContainerConfirmPayload;
use botfleet_models::entities::prelude::{ComposeFileModel, DeploymentModel};
use botfleet_models::enums::DeploymentState;
use chrono::Utc;
use common::{context, device, envelope, RecordingPublisher, TENANT};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn compose_file() -> ComposeFileModel {
    ComposeFileModel {
        uuid: Uuid::new_v4(),
        id: "camera-stack".to_string(),
        tenant_id: TENANT.to_string(),
        name: "Camera stack".to_string(),
        content: json!({"services": {"camera": {"image": "fleet/camera:2"}}}),
        created_at: Utc::now(),
    }
}

fn assignment(device_uuid: Uuid, state: DeploymentState) -> DeploymentModel {
    DeploymentModel {
        uuid: Uuid::new_v4(),
        tenant_id: TENANT.to_string(),
        device_uuid,
        compose_file_uuid: Uuid::new_v4(),
        state,
        error_code: None,
        created_at: Utc::now(),
    }
}

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    let mut row = BTreeMap::new();
    row.insert("num_items", Value::BigInt(Some(n)));
    row
}

#[tokio::test]
async fn deploy_creates_the_assignment_slot_and_pushes_content() {
    let robot = device(true);
    let compose = compose_file();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_query_results([vec![compose.clone()]])
        .append_query_results([Vec::<DeploymentModel>::new()])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    ContainerService::deploy(&ctx, TENANT, "robot-1", "camera-stack")
        .await
        .unwrap();

    let recorded = publisher.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        recorded[0].topic,
        format!("{TENANT}/robot-1/containers/config")
    );
    let body = recorded[0].json();
    assert_eq!(body["uuid"], json!(robot.uuid));
    assert_eq!(body["compose"], compose.content);
}

#[tokio::test]
async fn deploy_over_an_existing_slot_retargets_it() {
    let robot = device(true);
    let compose = compose_file();
    let existing = assignment(robot.uuid, DeploymentState::Error);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_query_results([vec![compose.clone()]])
        .append_query_results([vec![existing.clone()]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let uuid = ContainerService::deploy(&ctx, TENANT, "robot-1", "camera-stack")
        .await
        .unwrap();
    assert_eq!(uuid, existing.uuid);
    assert_eq!(publisher.recorded().len(), 1);
}

#[tokio::test]
async fn remove_without_an_assignment_is_rejected() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_query_results([Vec::<DeploymentModel>::new()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let err = ContainerService::remove(&ctx, TENANT, "robot-1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Precondition {
            code: codes::NO_DEPLOYMENT
        }
    ));
    assert!(publisher.recorded().is_empty());
}

#[tokio::test]
async fn remove_pushes_a_null_compose_and_goes_pending_down() {
    let robot = device(true);
    let existing = assignment(robot.uuid, DeploymentState::Up);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_query_results([vec![existing]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    ContainerService::remove(&ctx, TENANT, "robot-1")
        .await
        .unwrap();

    let recorded = publisher.recorded();
    assert_eq!(recorded.len(), 1);
    let body = recorded[0].json();
    assert_eq!(body["uuid"], json!(robot.uuid));
    assert!(body["compose"].is_null());
}

#[tokio::test]
async fn compose_file_with_undrained_assignments_cannot_be_deleted() {
    let compose = compose_file();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![compose.clone()]])
        .append_query_results([vec![count_row(2)]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let err = ContainerService::delete_compose_file(&ctx, TENANT, "camera-stack")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Precondition {
            code: codes::COMPOSE_FILE_IN_USE
        }
    ));
}

#[tokio::test]
async fn drained_compose_file_is_deleted() {
    let compose = compose_file();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![compose.clone()]])
        .append_query_results([vec![count_row(0)]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    ContainerService::delete_compose_file(&ctx, TENANT, "camera-stack")
        .await
        .unwrap();
}

#[tokio::test]
async fn device_reported_up_lands_on_the_assignment() {
    let robot = device(true);
    let existing = assignment(robot.uuid, DeploymentState::PendingUp);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![existing]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = ContainerConfirmPayload {
        uuid: robot.uuid,
        state: "up".to_string(),
        error_code: None,
    };
    handlers::handle_container_confirm(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
    assert_eq!(ctx.metrics.snapshot().confirms_rejected, 0);
}

#[tokio::test]
async fn cloud_owned_states_are_rejected_from_devices() {
    let robot = device(true);
    // The state is rejected before any lookup; no results are staged.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    for state in ["pending_up", "pending_down", "restarting"] {
        let payload = ContainerConfirmPayload {
            uuid: robot.uuid,
            state: state.to_string(),
            error_code: None,
        };
        handlers::handle_container_confirm(&ctx, &envelope(&robot, &payload))
            .await
            .unwrap();
    }
    assert_eq!(ctx.metrics.snapshot().confirms_rejected, 3);
}
