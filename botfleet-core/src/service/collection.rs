//! Log and vitals collection channels.

use super::require_provisioned_device;
use crate::publish::publish_config;
use crate::topics::OutboundChannel;
use crate::SyncContext;
use botfleet_error::{sync::SyncError, SyncResult};
use botfleet_models::domain::wire::ChannelConfigPayload;
use botfleet_repository::{DeviceRepository, LogRecordRepository};
use sea_orm::TransactionTrait;
use tracing::info;

pub struct CollectionService;

impl CollectionService {
    /// Toggle log collection and push the new setting to the device.
    pub async fn configure_logs(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        enabled: bool,
    ) -> SyncResult<()> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        DeviceRepository::set_logs_enabled(device.uuid, enabled, &ctx.db).await?;
        publish_config(
            ctx.publisher.as_ref(),
            tenant_id,
            device_id,
            OutboundChannel::LogsConfig,
            &ChannelConfigPayload { enabled },
        )
        .await?;
        info!(device_id, enabled, "log collection reconfigured");
        Ok(())
    }

    /// Toggle vitals collection and push the new setting to the device.
    pub async fn configure_vitals(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        enabled: bool,
    ) -> SyncResult<()> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        DeviceRepository::set_vitals_enabled(device.uuid, enabled, &ctx.db).await?;
        publish_config(
            ctx.publisher.as_ref(),
            tenant_id,
            device_id,
            OutboundChannel::VitalsConfig,
            &ChannelConfigPayload { enabled },
        )
        .await?;
        info!(device_id, enabled, "vitals collection reconfigured");
        Ok(())
    }

    /// Drop every stored log record for a device and zero its counters.
    ///
    /// The deletion and the counter reset commit together so the counters
    /// never describe rows that are gone.
    pub async fn delete_logs(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
    ) -> SyncResult<u64> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;

        let txn = ctx.db.begin().await.map_err(SyncError::from)?;
        let deleted = LogRecordRepository::delete_by_device(device.uuid, &txn).await?;
        DeviceRepository::reset_log_counters(device.uuid, &txn).await?;
        txn.commit().await.map_err(SyncError::from)?;

        info!(device_id, deleted, "log records purged");
        Ok(deleted)
    }
}
