mod common;

use botfleet_core::handlers;
use botfleet_models::domain::wire::{DataIngestPayload, LogIngestPayload, VitalsIngestPayload};
use botfleet_models::entities::prelude::StreamModel;
use chrono::Utc;
use common::{context, device, envelope, stream, RecordingPublisher};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::json;

fn exec_ok() -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected: 1,
    }
}

#[tokio::test]
async fn accepted_data_point_writes_the_point_and_the_counters() {
    let robot = device(true);
    let imu = stream(&robot, "/imu", true);
    // Insert plus the two counter statements, all inside the transaction.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![imu.clone()]])
        .append_exec_results([exec_ok(), exec_ok(), exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = DataIngestPayload {
        source: "/imu".to_string(),
        sent_at: Utc::now(),
        payload: json!({"orientation": {"w": 1.0}}),
    };
    handlers::handle_data_ingest(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn data_for_an_unknown_stream_is_dropped() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<StreamModel>::new()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = DataIngestPayload {
        source: "/unknown".to_string(),
        sent_at: Utc::now(),
        payload: json!({}),
    };
    handlers::handle_data_ingest(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn data_for_a_disabled_stream_is_dropped() {
    let robot = device(true);
    let imu = stream(&robot, "/imu", false);
    // No exec results staged; an insert would fail the test.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![imu]])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = DataIngestPayload {
        source: "/imu".to_string(),
        sent_at: Utc::now(),
        payload: json!({}),
    };
    handlers::handle_data_ingest(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn log_record_is_stored_with_its_counters() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_ok(), exec_ok(), exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = LogIngestPayload {
        stamp: Utc::now(),
        level: "warn".to_string(),
        name: "navigation".to_string(),
        file: "planner.py".to_string(),
        function: "replan".to_string(),
        line: 88,
        msg: "costmap update lagging".to_string(),
    };
    handlers::handle_logs_ingest(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
}

#[tokio::test]
async fn vitals_sample_is_persisted() {
    let robot = device(true);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_ok()])
        .into_connection();

    let publisher = RecordingPublisher::new();
    let ctx = context(db, publisher.clone());

    let payload = VitalsIngestPayload {
        battery: 0.72,
        cpu: 0.41,
        ram: 0.55,
        disk: 0.13,
    };
    handlers::handle_vitals_ingest(&ctx, &envelope(&robot, &payload))
        .await
        .unwrap();
}
