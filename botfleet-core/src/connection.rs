//! MQTT connection lifecycle.
//!
//! One supervisor task owns the broker connection:
//! `connecting → connected → disconnected → reconnecting → connected | closed`.
//! On ConnAck it (re)subscribes every registered inbound pattern at its
//! declared quality. Reconnection is a fixed configured period, not a
//! backoff; device traffic is not latency-sensitive at the reconnect
//! boundary and the period keeps behavior predictable.

use crate::topics::subscription_filters;
use arc_swap::ArcSwapOption;
use botfleet_error::{sync::SyncError, SyncResult};
use botfleet_models::settings::Mqtt;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, Publish};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Shared client entry for lock-free access.
///
/// The supervisor owns the lifecycle and swaps the client in on ConnAck and
/// out on any disconnect; publishers read it without locks.
pub struct ClientEntry {
    pub client: ArcSwapOption<AsyncClient>,
    pub healthy: AtomicBool,
}

impl ClientEntry {
    pub fn new_empty() -> Self {
        Self {
            client: ArcSwapOption::from(None),
            healthy: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    fn set_connected(&self, client: &AsyncClient) {
        self.client.store(Some(Arc::new(client.clone())));
        self.healthy.store(true, Ordering::Release);
    }

    fn set_disconnected(&self) {
        self.client.store(None);
        self.healthy.store(false, Ordering::Release);
    }
}

/// Externally observable connection states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Reconnecting,
    Closed,
}

fn build_mqtt_client(config: &Mqtt) -> (AsyncClient, EventLoop) {
    let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username, password);
    }
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
    options.set_clean_session(true);
    AsyncClient::new(options, config.event_channel_capacity)
}

async fn subscribe_registered(client: &AsyncClient) -> SyncResult<()> {
    for (filter, quality) in subscription_filters() {
        client
            .subscribe(&filter, quality.into())
            .await
            .map_err(|e| SyncError::transport(format!("subscribe '{filter}' failed: {e}")))?;
        debug!(filter, "subscribed");
    }
    Ok(())
}

/// Connection supervisor.
///
/// Inbound publishes are forwarded on `inbound_tx`; connection state
/// transitions are broadcast on `state_tx`.
pub struct ConnectionSupervisor {
    config: Mqtt,
    cancel: CancellationToken,
    state_tx: watch::Sender<ConnectionState>,
    inbound_tx: mpsc::Sender<Publish>,
    shared_client: Arc<ClientEntry>,
}

impl ConnectionSupervisor {
    pub fn new(
        config: Mqtt,
        cancel: CancellationToken,
        state_tx: watch::Sender<ConnectionState>,
        inbound_tx: mpsc::Sender<Publish>,
        shared_client: Arc<ClientEntry>,
    ) -> Self {
        Self {
            config,
            cancel,
            state_tx,
            inbound_tx,
            shared_client,
        }
    }

    /// Drive the connection until cancelled.
    pub async fn run(self) {
        let reconnect_period = Duration::from_millis(self.config.reconnect_period_ms);
        let mut first_attempt = true;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let state = if first_attempt {
                ConnectionState::Connecting
            } else {
                ConnectionState::Reconnecting
            };
            let _ = self.state_tx.send(state);
            info!(?state, host = %self.config.host, port = self.config.port, "mqtt connection attempt");
            first_attempt = false;

            let (client, event_loop) = build_mqtt_client(&self.config);
            self.run_session(client, event_loop).await;

            if self.cancel.is_cancelled() {
                break;
            }

            let _ = self.state_tx.send(ConnectionState::Disconnected);
            info!(
                delay_ms = reconnect_period.as_millis() as u64,
                "mqtt disconnected, retrying after fixed period"
            );
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(reconnect_period) => {}
            }
        }

        self.shared_client.set_disconnected();
        let _ = self.state_tx.send(ConnectionState::Closed);
        info!("mqtt supervisor closed");
    }

    /// Run one session: wait for ConnAck within the configured timeout, then
    /// pump the event loop until disconnect or cancellation.
    async fn run_session(&self, client: AsyncClient, mut event_loop: EventLoop) {
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);

        // The broker has connect_timeout to acknowledge the session.
        match tokio::time::timeout(connect_timeout, event_loop.poll()).await {
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                info!("mqtt connection established");
            }
            Ok(Ok(event)) => {
                warn!(?event, "unexpected event before ConnAck");
                return;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "mqtt connect failed");
                return;
            }
            Err(_) => {
                warn!(
                    timeout_ms = connect_timeout.as_millis() as u64,
                    "mqtt connect timed out"
                );
                return;
            }
        }

        if let Err(e) = subscribe_registered(&client).await {
            warn!(error = %e, "failed to subscribe registered patterns");
            return;
        }

        self.shared_client.set_connected(&client);
        let _ = self.state_tx.send(ConnectionState::Connected);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("event loop cancelled, disconnecting");
                    self.shared_client.set_disconnected();
                    let _ = client.disconnect().await;
                    break;
                }
                result = event_loop.poll() => {
                    match result {
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            if self.inbound_tx.send(publish).await.is_err() {
                                warn!("inbound channel closed, terminating event loop");
                                self.shared_client.set_disconnected();
                                break;
                            }
                        }
                        Ok(Event::Incoming(Packet::Disconnect)) => {
                            info!("mqtt server sent disconnect");
                            self.shared_client.set_disconnected();
                            break;
                        }
                        Ok(event) => {
                            debug!(?event, "mqtt event");
                        }
                        Err(e) => {
                            warn!(error = %e, "mqtt event loop error");
                            self.shared_client.set_disconnected();
                            break;
                        }
                    }
                }
            }
        }
    }
}
