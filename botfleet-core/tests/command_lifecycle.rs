mod common;

use botfleet_core::handlers;
use botfleet_core::service::commands::CommandService;
use botfleet_core::topics::Quality;
use botfleet_error::sync::{codes, SyncError};
use botfleet_models::domain::ops::NewCommand;
use botfleet_models::domain::wire::CommandConfirmPayload;
use botfleet_models::entities::prelude::{CommandModel, DeviceModel};
use botfleet_models::enums::{CommandInterface, CommandState};
use chrono::Utc;
use common::{context, device, envelope, failing_context, RecordingPublisher, TENANT};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;
use uuid::Uuid;

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

fn twist_command() -> NewCommand {
    NewCommand {
        interface: CommandInterface::Topic,
        name: "/cmd_vel".to_string(),
        kind: "geometry_msgs/msg/Twist".to_string(),
        payload: json!({"linear": {"x": 0.5}}),
    }
}

fn stored_command(robot: &DeviceModel, state: CommandState) -> CommandModel {
    CommandModel {
        uuid: Uuid::new_v4(),
        tenant_id: TENANT.to_string(),
        device_uuid: robot.uuid,
        interface: CommandInterface::Topic,
        name: "/cmd_vel".to_string(),
        kind: "geometry_msgs/msg/Twist".to_string(),
        payload: json!({}),
        state,
        error_code: None,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn send_to_online_device_publishes_and_marks_sent() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_exec_results([exec_ok(), exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let uuid = CommandService::send(&ctx, TENANT, "robot-1", twist_command())
        .await
        .unwrap();

    let recorded = publisher.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].topic, format!("{TENANT}/robot-1/commands/send"));
    assert_eq!(recorded[0].quality, Quality::AtMostOnce);

    let body = recorded[0].json();
    assert_eq!(body["uuid"], json!(uuid));
    assert_eq!(body["interface"], "topic");
    assert_eq!(body["type"], "geometry_msgs/msg/Twist");
    assert!(body.get("kind").is_none());
}

#[tokio::test]
async fn send_to_offline_device_fails_the_command_without_publishing() {
    let robot = device(false);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_exec_results([exec_ok(), exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let err = CommandService::send(&ctx, TENANT, "robot-1", twist_command())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Precondition {
            code: codes::DEVICE_NOT_ONLINE
        }
    ));
    assert!(publisher.recorded().is_empty());
}

#[tokio::test]
async fn broker_failure_fails_the_command_instead_of_stranding_it() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot.clone()]])
        .append_exec_results([exec_ok(), exec_ok()])
        .into_connection();

    let ctx = failing_context(db);

    let err = CommandService::send(&ctx, TENANT, "robot-1", twist_command())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Transport { .. }));

    // Device lookup, insert, and the error-state update. Without the
    // update the row would sit in `created` with no confirm ever coming.
    let log = ctx.db.into_transaction_log();
    assert_eq!(log.len(), 3);
}

#[tokio::test]
async fn send_to_unprovisioned_device_is_not_found() {
    let mut robot = device(true);
    robot.provisioned = false;
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![robot]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let err = CommandService::send(&ctx, TENANT, "robot-1", twist_command())
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotFound { .. }));
    assert!(publisher.recorded().is_empty());
}

#[tokio::test]
async fn successful_confirmation_marks_command_executed() {
    let robot = device(true);
    let command = stored_command(&robot, CommandState::Sent);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![command.clone()]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = CommandConfirmPayload {
        uuid: command.uuid,
        success: true,
        error_code: None,
    };
    handlers::handle_command_confirm(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
    assert_eq!(ctx.metrics.snapshot().confirms_rejected, 0);
}

#[tokio::test]
async fn duplicate_confirmation_for_terminal_command_is_a_no_op() {
    let robot = device(true);
    let command = stored_command(&robot, CommandState::Executed);
    // No exec results appended; a state write would fail the test.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![command.clone()]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = CommandConfirmPayload {
        uuid: command.uuid,
        success: false,
        error_code: Some("motor_fault".to_string()),
    };
    handlers::handle_command_confirm(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
    assert_eq!(ctx.metrics.snapshot().confirms_rejected, 0);
}

#[tokio::test]
async fn confirmation_for_unknown_command_is_dropped_and_counted() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<CommandModel>::new()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = CommandConfirmPayload {
        uuid: Uuid::new_v4(),
        success: true,
        error_code: None,
    };
    handlers::handle_command_confirm(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
    assert_eq!(ctx.metrics.snapshot().confirms_rejected, 1);
}

#[tokio::test]
async fn in_flight_command_cannot_be_deleted() {
    let robot = device(true);
    let command = stored_command(&robot, CommandState::Sent);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![command.clone()]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let err = CommandService::delete(&ctx, TENANT, command.uuid)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Precondition {
            code: codes::COMMAND_NOT_TERMINAL
        }
    ));
}

#[tokio::test]
async fn terminal_command_is_deleted() {
    let robot = device(true);
    let command = stored_command(&robot, CommandState::Error);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![command.clone()]])
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    CommandService::delete(&ctx, TENANT, command.uuid)
        .await
        .unwrap();
}
