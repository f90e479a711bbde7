#![allow(dead_code)]

use async_trait::async_trait;
use botfleet_core::dispatch::Envelope;
use botfleet_core::metrics::SyncMetrics;
use botfleet_core::publish::Publisher;
use botfleet_core::topics::Quality;
use botfleet_core::SyncContext;
use botfleet_error::{sync::SyncError, SyncResult};
use botfleet_models::entities::prelude::{DeviceModel, StreamModel};
use bytes::Bytes;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TENANT: &str = "0a651c10-6a1e-4f0f-9c3d-8b2f4e5a7d01";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub topic: String,
    pub payload: Vec<u8>,
    pub quality: Quality,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.payload).unwrap()
    }
}

/// Publisher fake that records everything instead of talking to a broker.
#[derive(Default)]
pub struct RecordingPublisher {
    records: Mutex<Vec<Recorded>>,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>, quality: Quality) -> SyncResult<()> {
        self.records.lock().unwrap().push(Recorded {
            topic: topic.to_string(),
            payload,
            quality,
        });
        Ok(())
    }
}

/// Publisher fake whose broker is always unreachable.
pub struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, topic: &str, _payload: Vec<u8>, _quality: Quality) -> SyncResult<()> {
        Err(SyncError::transport(format!(
            "publish to '{topic}' failed: broker unavailable"
        )))
    }
}

pub fn context(db: DatabaseConnection, publisher: Arc<RecordingPublisher>) -> SyncContext {
    SyncContext {
        db,
        publisher,
        metrics: Arc::new(SyncMetrics::default()),
    }
}

pub fn failing_context(db: DatabaseConnection) -> SyncContext {
    SyncContext {
        db,
        publisher: Arc::new(FailingPublisher),
        metrics: Arc::new(SyncMetrics::default()),
    }
}

pub fn device(online: bool) -> DeviceModel {
    DeviceModel {
        uuid: Uuid::new_v4(),
        id: "robot-1".to_string(),
        tenant_id: TENANT.to_string(),
        name: "Robot One".to_string(),
        provisioned: true,
        online,
        online_updated_at: Some(Utc::now()),
        agent_version: Some("1.4.2".to_string()),
        logs_enabled: true,
        logs_first_recording: None,
        logs_last_recording: None,
        logs_num_recordings: 0,
        vitals_enabled: true,
        created_at: Utc::now(),
    }
}

pub fn stream(device: &DeviceModel, source: &str, enabled: bool) -> StreamModel {
    StreamModel {
        uuid: Uuid::new_v4(),
        tenant_id: device.tenant_id.clone(),
        device_uuid: device.uuid,
        source: source.to_string(),
        kind: "sensor_msgs/msg/Imu".to_string(),
        hz: 10.0,
        enabled,
        first_recording: None,
        last_recording: None,
        num_recordings: 0,
        created_at: Utc::now(),
    }
}

pub fn envelope<T: Serialize>(device: &DeviceModel, payload: &T) -> Envelope {
    Envelope {
        tenant_id: device.tenant_id.clone(),
        device_uuid: device.uuid,
        device_id: device.id.clone(),
        payload: Bytes::from(serde_json::to_vec(payload).unwrap()),
    }
}
