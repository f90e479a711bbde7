mod common;

use botfleet_core::handlers;
use botfleet_core::topics::Quality;
use botfleet_models::domain::wire::PresencePayload;
use botfleet_models::entities::prelude::{ComposeFileModel, DeploymentModel, StreamModel};
use botfleet_models::enums::DeploymentState;
use chrono::Utc;
use common::{context, device, envelope, stream, RecordingPublisher, TENANT};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

fn online_payload() -> PresencePayload {
    PresencePayload {
        online: true,
        agent_version: Some("1.5.0".to_string()),
    }
}

#[tokio::test]
async fn online_presence_with_pending_assignment_pushes_all_four_channels() {
    let robot = device(false);
    let compose_file = ComposeFileModel {
        uuid: Uuid::new_v4(),
        id: "camera-stack".to_string(),
        tenant_id: TENANT.to_string(),
        name: "Camera stack".to_string(),
        content: json!({"services": {"camera": {"image": "fleet/camera:2"}}}),
        created_at: Utc::now(),
    };
    let assignment = DeploymentModel {
        uuid: Uuid::new_v4(),
        tenant_id: TENANT.to_string(),
        device_uuid: robot.uuid,
        compose_file_uuid: compose_file.uuid,
        state: DeploymentState::PendingUp,
        error_code: None,
        created_at: Utc::now(),
    };
    let imu = stream(&robot, "/imu", true);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![robot.clone()]])
        .append_query_results([vec![assignment]])
        .append_query_results([vec![compose_file.clone()]])
        .append_query_results([vec![imu.clone()]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    handlers::handle_presence(&ctx, &envelope(&robot, &online_payload()))
        .await
        .unwrap();

    let recorded = publisher.recorded();
    let topics: Vec<&str> = recorded.iter().map(|r| r.topic.as_str()).collect();
    assert_eq!(
        topics,
        vec![
            format!("{TENANT}/robot-1/containers/config"),
            format!("{TENANT}/robot-1/logs/config"),
            format!("{TENANT}/robot-1/data/config"),
            format!("{TENANT}/robot-1/vitals/config"),
        ]
    );
    assert!(recorded.iter().all(|r| r.quality == Quality::AtMostOnce));

    let containers = recorded[0].json();
    assert_eq!(containers["uuid"], json!(robot.uuid));
    assert_eq!(containers["compose"], compose_file.content);

    assert_eq!(recorded[1].json(), json!({"enabled": true}));

    let data = recorded[2].json();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["source"], "/imu");
    assert_eq!(data[0]["type"], "sensor_msgs/msg/Imu");

    assert_eq!(ctx.metrics.snapshot().resync_pushes, 1);
}

#[tokio::test]
async fn resync_data_config_carries_exactly_the_enabled_streams() {
    let robot = device(false);
    let imu = stream(&robot, "/imu", true);
    let odom = stream(&robot, "/odom", true);
    // A disabled stream never comes back from the enabled-only query, so
    // only the two enabled rows are staged; the filter itself is asserted
    // against the issued SQL below.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![robot.clone()]])
        .append_query_results([Vec::<DeploymentModel>::new()])
        .append_query_results([vec![imu, odom]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    handlers::handle_presence(&ctx, &envelope(&robot, &online_payload()))
        .await
        .unwrap();

    let recorded = publisher.recorded();
    let data = recorded
        .iter()
        .find(|r| r.topic.ends_with("/data/config"))
        .unwrap()
        .json();
    let sources: Vec<&str> = data
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["source"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["/imu", "/odom"]);
    assert!(data.as_array().unwrap().iter().all(|item| item["enabled"] == true));

    let issued = format!("{:?}", ctx.db.into_transaction_log()).replace("\\\"", "\"");
    assert!(
        issued.contains(r#""stream"."enabled" ="#),
        "stream query must filter on enabled: {issued}"
    );
}

#[tokio::test]
async fn converged_assignment_is_not_republished() {
    let robot = device(false);
    let assignment = DeploymentModel {
        uuid: Uuid::new_v4(),
        tenant_id: TENANT.to_string(),
        device_uuid: robot.uuid,
        compose_file_uuid: Uuid::new_v4(),
        state: DeploymentState::Up,
        error_code: None,
        created_at: Utc::now(),
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_query_results([vec![robot.clone()]])
        .append_query_results([vec![assignment]])
        .append_query_results([Vec::<StreamModel>::new()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    handlers::handle_presence(&ctx, &envelope(&robot, &online_payload()))
        .await
        .unwrap();

    let recorded = publisher.recorded();
    let topics: Vec<&str> = recorded.iter().map(|r| r.topic.as_str()).collect();
    assert_eq!(
        topics,
        vec![
            format!("{TENANT}/robot-1/logs/config"),
            format!("{TENANT}/robot-1/data/config"),
            format!("{TENANT}/robot-1/vitals/config"),
        ]
    );
    assert_eq!(recorded[1].json(), json!([]));
}

#[tokio::test]
async fn offline_presence_records_state_without_resync() {
    let robot = device(true);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = PresencePayload {
        online: false,
        agent_version: None,
    };
    handlers::handle_presence(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();

    assert!(publisher.recorded().is_empty());
    assert_eq!(ctx.metrics.snapshot().resync_pushes, 0);
}

#[tokio::test]
async fn malformed_presence_is_counted_and_rejected() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let env = botfleet_core::dispatch::Envelope {
        tenant_id: robot.tenant_id.clone(),
        device_uuid: robot.uuid,
        device_id: robot.id.clone(),
        payload: bytes::Bytes::from_static(b"{\"online\": \"sort of\"}"),
    };
    assert!(handlers::handle_presence(&ctx, &env).await.is_err());
    assert_eq!(ctx.metrics.snapshot().dropped_malformed, 1);
    assert!(publisher.recorded().is_empty());
}
