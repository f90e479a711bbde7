//! Inbound dispatcher.
//!
//! Consumes publishes from the connection supervisor one at a time, parses
//! the address, resolves the device, matches the registry and hands the
//! message to the device's worker. The dispatcher itself stays serial so a
//! device's messages reach its worker in receipt order.

use crate::topics::TopicAddress;
use crate::workers::{DeviceWorkers, Job};
use crate::SyncContext;
use botfleet_repository::DeviceRepository;
use bytes::Bytes;
use rumqttc::Publish;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A routed inbound message, addressed to a known device.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub tenant_id: String,
    pub device_uuid: Uuid,
    pub device_id: String,
    pub payload: Bytes,
}

pub struct Dispatcher {
    ctx: Arc<SyncContext>,
    workers: Arc<DeviceWorkers>,
}

impl Dispatcher {
    pub fn new(ctx: Arc<SyncContext>, workers: Arc<DeviceWorkers>) -> Self {
        Self { ctx, workers }
    }

    pub async fn run(self, mut inbound_rx: mpsc::Receiver<Publish>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = inbound_rx.recv() => {
                    match message {
                        Some(publish) => self.process(publish).await,
                        None => break,
                    }
                }
            }
        }
        info!("inbound dispatcher stopped");
    }

    async fn process(&self, publish: Publish) {
        let Some(address) = TopicAddress::parse(&publish.topic) else {
            self.ctx.metrics.incr_dropped_malformed();
            debug!(topic = %publish.topic, "dropping message with unparseable address");
            return;
        };

        // The device must already exist; it is created by provisioning, not
        // by traffic.
        let device = match DeviceRepository::find_by_slug(
            &address.tenant_id,
            &address.device_id,
            &self.ctx.db,
        )
        .await
        {
            Ok(Some(device)) => device,
            Ok(None) => {
                self.ctx.metrics.incr_dropped_unknown_device();
                warn!(
                    tenant_id = %address.tenant_id,
                    device_id = %address.device_id,
                    "dropping message from unknown device"
                );
                return;
            }
            Err(e) => {
                warn!(error = %e, "device lookup failed, dropping message");
                return;
            }
        };

        let Some(spec) = address.matched_spec() else {
            self.ctx.metrics.incr_dropped_unmatched();
            debug!(suffix = %address.suffix, "no registered inbound kind matched");
            return;
        };

        self.ctx.metrics.incr_dispatched();
        self.workers
            .dispatch(Job {
                kind: spec.kind,
                envelope: Envelope {
                    tenant_id: address.tenant_id,
                    device_uuid: device.uuid,
                    device_id: address.device_id,
                    payload: publish.payload.clone(),
                },
            })
            .await;
    }
}
