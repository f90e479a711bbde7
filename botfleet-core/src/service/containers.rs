//! Container orchestration: compose file templates and the per-device
//! deployment assignment slot.

use super::require_provisioned_device;
use crate::publish::publish_config;
use crate::topics::OutboundChannel;
use crate::SyncContext;
use botfleet_error::{
    sync::{codes, SyncError},
    SyncResult,
};
use botfleet_models::{
    domain::{ops::NewComposeFile, wire::ContainerConfigPayload},
    entities::prelude::{ComposeFileModel, DeploymentModel},
    enums::DeploymentState,
};
use botfleet_repository::{ComposeFileRepository, DeploymentRepository};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

pub struct ContainerService;

impl ContainerService {
    /// Register a compose file template. Templates are immutable; operators
    /// create a new one to change the content.
    pub async fn create_compose_file(
        ctx: &SyncContext,
        tenant_id: &str,
        request: NewComposeFile,
    ) -> SyncResult<Uuid> {
        let compose_file = ComposeFileModel {
            uuid: Uuid::new_v4(),
            id: request.id,
            tenant_id: tenant_id.to_string(),
            name: request.name,
            content: request.content,
            created_at: Utc::now(),
        };
        let uuid = compose_file.uuid;
        ComposeFileRepository::create(compose_file, &ctx.db).await?;
        info!(compose_file_uuid = %uuid, "compose file created");
        Ok(uuid)
    }

    /// Delete a compose file template.
    ///
    /// Refused while any referencing assignment has not drained to `down`;
    /// a device could otherwise be running containers whose definition no
    /// longer exists.
    pub async fn delete_compose_file(
        ctx: &SyncContext,
        tenant_id: &str,
        compose_id: &str,
    ) -> SyncResult<()> {
        let compose_file = ComposeFileRepository::find_by_slug(tenant_id, compose_id, &ctx.db)
            .await?
            .ok_or(SyncError::NotFound {
                what: "compose file",
            })?;

        let undrained =
            DeploymentRepository::count_undrained_by_compose_file(compose_file.uuid, &ctx.db)
                .await?;
        if undrained > 0 {
            return Err(SyncError::precondition(codes::COMPOSE_FILE_IN_USE));
        }

        ComposeFileRepository::delete(tenant_id, compose_file.uuid, &ctx.db).await?;
        info!(compose_file_uuid = %compose_file.uuid, "compose file deleted");
        Ok(())
    }

    /// Assign a compose file to a device and push the content.
    ///
    /// A device has a single assignment slot: deploying over an existing
    /// assignment retargets it, whatever state the old one was in. The slot
    /// goes to `pending_up` until the device confirms.
    pub async fn deploy(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        compose_id: &str,
    ) -> SyncResult<Uuid> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        let compose_file = ComposeFileRepository::find_by_slug(tenant_id, compose_id, &ctx.db)
            .await?
            .ok_or(SyncError::NotFound {
                what: "compose file",
            })?;

        let assignment_uuid = match DeploymentRepository::find_by_device(
            tenant_id,
            device.uuid,
            &ctx.db,
        )
        .await?
        {
            Some(existing) => {
                DeploymentRepository::retarget(
                    existing.uuid,
                    compose_file.uuid,
                    DeploymentState::PendingUp,
                    &ctx.db,
                )
                .await?;
                existing.uuid
            }
            None => {
                let assignment = DeploymentModel {
                    uuid: Uuid::new_v4(),
                    tenant_id: tenant_id.to_string(),
                    device_uuid: device.uuid,
                    compose_file_uuid: compose_file.uuid,
                    state: DeploymentState::PendingUp,
                    error_code: None,
                    created_at: Utc::now(),
                };
                let uuid = assignment.uuid;
                DeploymentRepository::create(assignment, &ctx.db).await?;
                uuid
            }
        };

        publish_config(
            ctx.publisher.as_ref(),
            tenant_id,
            device_id,
            OutboundChannel::ContainersConfig,
            &ContainerConfigPayload {
                uuid: device.uuid,
                compose: Some(compose_file.content),
            },
        )
        .await?;

        info!(
            device_id,
            compose_file_uuid = %compose_file.uuid,
            "deployment pushed to device"
        );
        Ok(assignment_uuid)
    }

    /// Ask the device to tear its containers down.
    ///
    /// The assignment row stays, in `pending_down`, until the device
    /// confirms `down`. Only a drained slot releases its compose file.
    pub async fn remove(ctx: &SyncContext, tenant_id: &str, device_id: &str) -> SyncResult<()> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;
        let assignment = DeploymentRepository::find_by_device(tenant_id, device.uuid, &ctx.db)
            .await?
            .ok_or(SyncError::precondition(codes::NO_DEPLOYMENT))?;

        DeploymentRepository::set_state(
            assignment.uuid,
            DeploymentState::PendingDown,
            None,
            &ctx.db,
        )
        .await?;

        publish_config(
            ctx.publisher.as_ref(),
            tenant_id,
            device_id,
            OutboundChannel::ContainersConfig,
            &ContainerConfigPayload {
                uuid: device.uuid,
                compose: None,
            },
        )
        .await?;

        info!(device_id, "deployment teardown pushed to device");
        Ok(())
    }
}
