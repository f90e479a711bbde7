//! Operator-facing services.
//!
//! These are the engine's outward interface: send a command, deploy or
//! remove a container bundle, manage streams, toggle the collection
//! channels. Each takes a tenant and a device slug and returns a typed
//! rejection on failure.

pub mod collection;
pub mod commands;
pub mod containers;
pub mod streams;

use crate::SyncContext;
use botfleet_error::{sync::SyncError, SyncResult};
use botfleet_models::entities::prelude::DeviceModel;
use botfleet_repository::DeviceRepository;

/// Resolve a device by `(device_id, tenant_id)` and require it to be
/// provisioned. Every operator action starts here. An unprovisioned device
/// has never announced itself and is treated as absent.
pub(crate) async fn require_provisioned_device(
    ctx: &SyncContext,
    tenant_id: &str,
    device_id: &str,
) -> SyncResult<DeviceModel> {
    let device = DeviceRepository::find_by_slug(tenant_id, device_id, &ctx.db)
        .await?
        .ok_or(SyncError::NotFound { what: "device" })?;
    if !device.provisioned {
        return Err(SyncError::NotFound {
            what: "provisioned device",
        });
    }
    Ok(device)
}
