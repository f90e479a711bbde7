//! Outbound publish capability.
//!
//! The engine never talks to the broker directly; it goes through the
//! [`Publisher`] trait so the composition root owns the real client and
//! tests can substitute a recording fake.

use crate::connection::ClientEntry;
use crate::topics::{format_topic, OutboundChannel, Quality};
use async_trait::async_trait;
use botfleet_error::{sync::SyncError, SyncResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, quality: Quality) -> SyncResult<()>;
}

/// Publisher over the supervisor-owned shared MQTT client.
pub struct MqttPublisher {
    entry: Arc<ClientEntry>,
}

impl MqttPublisher {
    pub fn new(entry: Arc<ClientEntry>) -> Self {
        Self { entry }
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: Vec<u8>, quality: Quality) -> SyncResult<()> {
        let client = self
            .entry
            .client
            .load_full()
            .ok_or_else(|| SyncError::transport("mqtt client not connected"))?;
        client
            .publish(topic, quality.into(), false, payload)
            .await
            .map_err(|e| SyncError::transport(format!("publish to '{topic}' failed: {e}")))?;
        debug!(topic, "published");
        Ok(())
    }
}

/// Serialize a typed payload and publish it on a per-device channel.
///
/// All five cloud-to-device channels are qos 0.
pub async fn publish_config<T: Serialize + Sync>(
    publisher: &dyn Publisher,
    tenant_id: &str,
    device_id: &str,
    channel: OutboundChannel,
    payload: &T,
) -> SyncResult<()> {
    let topic = format_topic(tenant_id, device_id, channel);
    let bytes = serde_json::to_vec(payload)?;
    publisher
        .publish(&topic, bytes, Quality::AtMostOnce)
        .await
}
