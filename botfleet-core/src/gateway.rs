//! Gateway composition root.
//!
//! Wires storage, the MQTT connection supervisor, the inbound dispatcher and
//! the per-device workers together, and owns their shutdown.

use crate::connection::{ClientEntry, ConnectionState, ConnectionSupervisor};
use crate::dispatch::Dispatcher;
use crate::metrics::{SyncMetrics, SyncMetricsSnapshot};
use crate::publish::MqttPublisher;
use crate::workers::DeviceWorkers;
use crate::SyncContext;
use botfleet_error::FleetResult;
use botfleet_models::settings::Settings;
use botfleet_storage::FleetDb;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

pub struct FleetGateway {
    ctx: Arc<SyncContext>,
    cancel: CancellationToken,
    state_rx: watch::Receiver<ConnectionState>,
}

impl FleetGateway {
    /// Bring the whole engine up: database and migrations first, then the
    /// dispatcher and the connection supervisor. Returns once the background
    /// tasks are spawned; the broker connection converges on its own.
    #[instrument(name = "gateway-start", skip_all)]
    pub async fn start(settings: &Settings) -> FleetResult<Self> {
        let conn = FleetDb::init(settings).await?;

        let shared_client = Arc::new(ClientEntry::new_empty());
        let ctx = Arc::new(SyncContext {
            db: conn,
            publisher: Arc::new(MqttPublisher::new(Arc::clone(&shared_client))),
            metrics: Arc::new(SyncMetrics::default()),
        });

        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (inbound_tx, inbound_rx) =
            mpsc::channel(settings.mqtt.event_channel_capacity);

        let workers = Arc::new(DeviceWorkers::new(
            Arc::clone(&ctx),
            settings.sync.worker_queue_capacity,
            cancel.clone(),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&ctx), workers);
        tokio::spawn(dispatcher.run(inbound_rx, cancel.clone()));

        let supervisor = ConnectionSupervisor::new(
            settings.mqtt.clone(),
            cancel.clone(),
            state_tx,
            inbound_tx,
            shared_client,
        );
        tokio::spawn(supervisor.run());

        info!("fleet gateway started");
        Ok(Self {
            ctx,
            cancel,
            state_rx,
        })
    }

    /// Shared context for the operator services.
    pub fn context(&self) -> Arc<SyncContext> {
        Arc::clone(&self.ctx)
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn metrics_snapshot(&self) -> SyncMetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// Stop the background tasks and close the database.
    #[instrument(name = "gateway-shutdown", skip_all)]
    pub async fn shutdown(&self) -> FleetResult<()> {
        info!("shutting down fleet gateway");
        self.cancel.cancel();
        FleetDb::close(&self.ctx.db).await?;
        info!("fleet gateway stopped");
        Ok(())
    }
}
