//! Command lifecycle: `created → sent → {executed | error}`.

use super::require_provisioned_device;
use crate::publish::publish_config;
use crate::topics::OutboundChannel;
use crate::SyncContext;
use botfleet_error::{
    sync::{codes, SyncError},
    SyncResult,
};
use botfleet_models::{
    domain::{ops::NewCommand, wire::CommandSendPayload},
    entities::prelude::CommandModel,
    enums::CommandState,
};
use botfleet_repository::CommandRepository;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct CommandService;

impl CommandService {
    /// Create a command and push it to the device.
    ///
    /// The record is durably inserted before any publish. An offline device
    /// fails the command immediately (`device_not_online`); there is no
    /// retry queue, the operator must resend.
    pub async fn send(
        ctx: &SyncContext,
        tenant_id: &str,
        device_id: &str,
        request: NewCommand,
    ) -> SyncResult<Uuid> {
        let device = require_provisioned_device(ctx, tenant_id, device_id).await?;

        let command = CommandModel {
            uuid: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            device_uuid: device.uuid,
            interface: request.interface,
            name: request.name.clone(),
            kind: request.kind.clone(),
            payload: request.payload.clone(),
            state: CommandState::Created,
            error_code: None,
            created_at: Utc::now(),
        };
        CommandRepository::create(command.clone(), &ctx.db).await?;

        if !device.online {
            CommandRepository::set_state(
                command.uuid,
                CommandState::Error,
                Some(codes::DEVICE_NOT_ONLINE.to_string()),
                &ctx.db,
            )
            .await?;
            warn!(device_id, "command rejected, device is not online");
            return Err(SyncError::precondition(codes::DEVICE_NOT_ONLINE));
        }

        // A command that never reached the broker gets no confirm; fail it
        // now so it terminates instead of sitting in `created` forever.
        if let Err(e) = publish_config(
            ctx.publisher.as_ref(),
            tenant_id,
            device_id,
            OutboundChannel::CommandsSend,
            &CommandSendPayload {
                uuid: command.uuid,
                interface: command.interface,
                name: command.name.clone(),
                kind: command.kind.clone(),
                payload: command.payload.clone(),
            },
        )
        .await
        {
            CommandRepository::set_state(
                command.uuid,
                CommandState::Error,
                Some(codes::PUBLISH_FAILED.to_string()),
                &ctx.db,
            )
            .await?;
            warn!(
                device_id,
                command_uuid = %command.uuid,
                error = %e,
                "command could not be pushed to the broker"
            );
            return Err(e);
        }

        CommandRepository::set_state(command.uuid, CommandState::Sent, None, &ctx.db).await?;
        info!(device_id, command_uuid = %command.uuid, "command sent to device");
        Ok(command.uuid)
    }

    /// Delete a terminal command. In-flight commands cannot be removed; the
    /// device may still confirm them.
    pub async fn delete(ctx: &SyncContext, tenant_id: &str, uuid: Uuid) -> SyncResult<()> {
        let command = CommandRepository::find_by_uuid(tenant_id, uuid, &ctx.db)
            .await?
            .ok_or(SyncError::NotFound { what: "command" })?;
        if !command.state.is_terminal() {
            return Err(SyncError::precondition(codes::COMMAND_NOT_TERMINAL));
        }
        CommandRepository::delete(tenant_id, uuid, &ctx.db).await?;
        info!(command_uuid = %uuid, "command deleted");
        Ok(())
    }
}
