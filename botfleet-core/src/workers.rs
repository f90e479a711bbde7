//! Per-device worker tasks.
//!
//! State-mutating handlers for the same device must run in receipt order;
//! devices may proceed in parallel. Each device gets one mpsc-fed task,
//! spawned on demand and stopped on cancellation. Handler failures are
//! logged and the message is considered consumed.

use crate::dispatch::Envelope;
use crate::handlers;
use crate::topics::InboundKind;
use crate::SyncContext;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct Job {
    pub kind: InboundKind,
    pub envelope: Envelope,
}

pub struct DeviceWorkers {
    ctx: Arc<SyncContext>,
    queue_capacity: usize,
    cancel: CancellationToken,
    senders: DashMap<Uuid, mpsc::Sender<Job>>,
}

impl DeviceWorkers {
    pub fn new(ctx: Arc<SyncContext>, queue_capacity: usize, cancel: CancellationToken) -> Self {
        Self {
            ctx,
            queue_capacity,
            cancel,
            senders: DashMap::new(),
        }
    }

    /// Queue a job on the device's worker, spawning it if needed.
    ///
    /// Backpressures when the device's queue is full, which in turn slows
    /// the serial dispatcher; ordering is preserved either way.
    pub async fn dispatch(&self, job: Job) {
        let device_uuid = job.envelope.device_uuid;
        let mut job = job;
        loop {
            let sender = self
                .senders
                .entry(device_uuid)
                .or_insert_with(|| self.spawn_worker(device_uuid))
                .clone();
            match sender.send(job).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    // Worker exited; drop the stale sender and respawn.
                    self.senders.remove(&device_uuid);
                    job = returned;
                    if self.cancel.is_cancelled() {
                        return;
                    }
                }
            }
        }
    }

    fn spawn_worker(&self, device_uuid: Uuid) -> mpsc::Sender<Job> {
        let (tx, mut rx) = mpsc::channel::<Job>(self.queue_capacity);
        let ctx = Arc::clone(&self.ctx);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    job = rx.recv() => {
                        let Some(job) = job else { break };
                        if let Err(e) = handlers::handle(&ctx, &job).await {
                            warn!(
                                device_uuid = %device_uuid,
                                kind = ?job.kind,
                                error = %e,
                                "handler failed, message consumed"
                            );
                        }
                    }
                }
            }
            debug!(device_uuid = %device_uuid, "device worker stopped");
        });
        tx
    }
}
