//! Device synchronization engine.
//!
//! The cloud side of a multi-tenant robot fleet: one MQTT connection to the
//! broker, per-device topic routing, presence-triggered resync, command and
//! container state machines, and telemetry ingest. [`gateway::FleetGateway`]
//! is the composition root; the [`service`] modules are the operator API.

pub mod connection;
pub mod dispatch;
pub mod gateway;
pub mod handlers;
pub mod metrics;
pub mod publish;
pub mod service;
pub mod topics;
pub mod workers;

use crate::metrics::SyncMetrics;
use crate::publish::Publisher;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared dependencies handed to every handler and service.
pub struct SyncContext {
    pub db: DatabaseConnection,
    pub publisher: Arc<dyn Publisher>,
    pub metrics: Arc<SyncMetrics>,
}
