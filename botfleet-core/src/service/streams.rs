//! Data stream management.
//!
//! Every mutation ends with a full data-config push so the device's
//! collection set converges immediately rather than at the next presence.

use super::require_provisioned_device;
use crate::publish::publish_config;
use crate::topics::OutboundChannel;
use crate::SyncContext;
use botfleet_error::{
    sync::{codes, SyncError},
    SyncResult,
};
use botfleet_models::{
    domain::{
        ops::{NewStream, StreamUpdate},
        wire::StreamConfigItem,
    },
    entities::prelude::{StreamActiveModel, StreamModel},
};
use botfleet_repository::StreamRepository;
use chrono::Utc;
use sea_orm::{ActiveValue::Set, IntoActiveModel};
use tracing::info;
use uuid::Uuid;

pub struct StreamService;

impl StreamService {
    /// Register a stream on a device. Streams are born enabled; the device
    /// starts uploading as soon as the config push lands.
    pub async fn create(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        request: NewStream,
    ) -> SyncResult<Uuid> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;

        if StreamRepository::find_by_source(device.uuid, &request.source, &ctx.db)
            .await?
            .is_some()
        {
            return Err(SyncError::precondition(codes::STREAM_ALREADY_EXISTS));
        }

        let stream = StreamModel {
            uuid: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            device_uuid: device.uuid,
            source: request.source,
            kind: request.kind,
            hz: request.hz,
            enabled: true,
            first_recording: None,
            last_recording: None,
            num_recordings: 0,
            created_at: Utc::now(),
        };
        let uuid = stream.uuid;
        StreamRepository::create(stream, &ctx.db).await?;
        info!(device_id, stream_uuid = %uuid, "stream created");

        push_data_config(ctx, tenant_id, device_id, device.uuid).await?;
        Ok(uuid)
    }

    /// Change a stream's rate or enablement.
    pub async fn update(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        uuid: Uuid,
        request: StreamUpdate,
    ) -> SyncResult<()> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        let stream = owned_stream(ctx, tenant_id, device.uuid, uuid).await?;

        let mut active: StreamActiveModel = stream.into_active_model();
        if let Some(hz) = request.hz {
            active.hz = Set(hz);
        }
        if let Some(enabled) = request.enabled {
            active.enabled = Set(enabled);
        }
        StreamRepository::update(active, &ctx.db).await?;
        info!(device_id, stream_uuid = %uuid, "stream updated");

        push_data_config(ctx, tenant_id, device_id, device.uuid).await?;
        Ok(())
    }

    /// Delete a stream and its recorded points.
    pub async fn delete(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        uuid: Uuid,
    ) -> SyncResult<()> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        let stream = owned_stream(ctx, tenant_id, device.uuid, uuid).await?;

        StreamRepository::delete(stream.uuid, &ctx.db).await?;
        info!(device_id, stream_uuid = %uuid, "stream deleted");

        push_data_config(ctx, tenant_id, device_id, device.uuid).await?;
        Ok(())
    }
}

async fn owned_stream(
    ctx: &SyncContext,
    tenant_id: &str,
    device_uuid: Uuid,
    uuid: Uuid,
) -> SyncResult<StreamModel> {
    let stream = StreamRepository::find_by_uuid(tenant_id, uuid, &ctx.db)
        .await?
        .ok_or(SyncError::NotFound { what: "stream" })?;
    if stream.device_uuid != device_uuid {
        return Err(SyncError::NotFound { what: "stream" });
    }
    Ok(stream)
}

/// Publish the device's enabled streams as its complete data config.
pub(crate) async fn push_data_config(
    ctx: &SyncContext,
    tenant_id: &str,
    device_id: &str,
    device_uuid: Uuid,
) -> SyncResult<()> {
    let streams = StreamRepository::find_enabled_by_device(device_uuid, &ctx.db).await?;
    let items: Vec<StreamConfigItem> = streams
        .into_iter()
        .map(|stream| StreamConfigItem {
            uuid: stream.uuid,
            source: stream.source,
            hz: stream.hz,
            kind: stream.kind,
            enabled: stream.enabled,
        })
        .collect();
    publish_config(
        ctx.publisher.as_ref(),
        tenant_id,
        device_id,
        OutboundChannel::DataConfig,
        &items,
    )
    .await
}
