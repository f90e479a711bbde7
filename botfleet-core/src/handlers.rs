//! Inbound message handlers.
//!
//! Each handler is invoked on the owning device's worker, so per-device
//! state mutations apply in receipt order. Handlers never fail the process;
//! rejections are logged, counted and the message is consumed.

use crate::dispatch::Envelope;
use crate::publish::publish_config;
use crate::service::streams::push_data_config;
use crate::topics::{InboundKind, OutboundChannel};
use crate::workers::Job;
use crate::SyncContext;
use botfleet_error::{sync::SyncError, SyncResult};
use botfleet_models::{
    domain::wire::{
        ChannelConfigPayload, CommandConfirmPayload, ContainerConfigPayload,
        ContainerConfirmPayload, DataIngestPayload, LogIngestPayload, PresencePayload,
        VitalsIngestPayload,
    },
    entities::prelude::{DataPointModel, LogRecordModel, VitalModel},
    enums::{CommandState, DeploymentState},
};
use botfleet_repository::{
    CommandRepository, ComposeFileRepository, DataPointRepository, DeploymentRepository,
    DeviceRepository, LogRecordRepository, StreamRepository, VitalRepository,
};
use chrono::Utc;
use sea_orm::TransactionTrait;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub async fn handle(ctx: &SyncContext, job: &Job) -> SyncResult<()> {
    match job.kind {
        InboundKind::Presence => handle_presence(ctx, &job.envelope).await,
        InboundKind::CommandConfirm => handle_command_confirm(ctx, &job.envelope).await,
        InboundKind::ContainerConfirm => handle_container_confirm(ctx, &job.envelope).await,
        InboundKind::LogIngest => handle_logs_ingest(ctx, &job.envelope).await,
        InboundKind::VitalIngest => handle_vitals_ingest(ctx, &job.envelope).await,
        InboundKind::DataIngest => handle_data_ingest(ctx, &job.envelope).await,
    }
}

fn parse_payload<T: DeserializeOwned>(ctx: &SyncContext, env: &Envelope) -> SyncResult<T> {
    serde_json::from_slice(&env.payload).map_err(|e| {
        ctx.metrics.incr_dropped_malformed();
        SyncError::protocol(format!(
            "malformed payload from device '{}': {e}",
            env.device_id
        ))
    })
}

/// Presence reconciler.
///
/// Records the observed online state (server time, device clocks are not
/// trusted for `online_updated_at`) and, when the device reports online,
/// pushes the full desired state. This resync is the device's only recovery
/// path after a disconnect; there is no periodic reconciliation loop.
pub async fn handle_presence(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: PresencePayload = parse_payload(ctx, env)?;
    info!(
        device_id = %env.device_id,
        online = payload.online,
        agent_version = ?payload.agent_version,
        "device updated its presence"
    );

    DeviceRepository::record_presence(
        env.device_uuid,
        payload.online,
        payload.agent_version.clone(),
        Utc::now(),
        &ctx.db,
    )
    .await?;

    if payload.online {
        resync(ctx, env).await?;
        ctx.metrics.incr_resync_pushes();
    }
    Ok(())
}

/// Push the cloud's current desired state on every configuration channel.
///
/// Unconditional and idempotent, not a diff. The container channel is
/// published only while an assignment is pending; terminal assignments have
/// already converged on the device.
async fn resync(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let device = DeviceRepository::find_by_uuid(env.device_uuid, &ctx.db)
        .await?
        .ok_or(SyncError::NotFound { what: "device" })?;

    if let Some(assignment) =
        DeploymentRepository::find_by_device(&env.tenant_id, env.device_uuid, &ctx.db).await?
    {
        if assignment.state.is_pending() {
            let compose = if assignment.state == DeploymentState::PendingUp {
                let compose_file = ComposeFileRepository::find_by_uuid(
                    &env.tenant_id,
                    assignment.compose_file_uuid,
                    &ctx.db,
                )
                .await?
                .ok_or(SyncError::NotFound {
                    what: "compose file",
                })?;
                Some(compose_file.content)
            } else {
                None
            };
            publish_config(
                ctx.publisher.as_ref(),
                &env.tenant_id,
                &env.device_id,
                OutboundChannel::ContainersConfig,
                &ContainerConfigPayload {
                    uuid: env.device_uuid,
                    compose,
                },
            )
            .await?;
        }
    }

    publish_config(
        ctx.publisher.as_ref(),
        &env.tenant_id,
        &env.device_id,
        OutboundChannel::LogsConfig,
        &ChannelConfigPayload {
            enabled: device.logs_enabled,
        },
    )
    .await?;

    push_data_config(ctx, &env.tenant_id, &env.device_id, env.device_uuid).await?;

    publish_config(
        ctx.publisher.as_ref(),
        &env.tenant_id,
        &env.device_id,
        OutboundChannel::VitalsConfig,
        &ChannelConfigPayload {
            enabled: device.vitals_enabled,
        },
    )
    .await?;

    Ok(())
}

/// Advance a command to its terminal state on device confirmation.
///
/// Unknown or foreign-tenant commands are a potential spoof, not a retryable
/// failure: logged, counted, dropped. Duplicate confirms for a terminal
/// command are accepted without effect (qos 1 redelivery must not corrupt
/// state).
pub async fn handle_command_confirm(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: CommandConfirmPayload = parse_payload(ctx, env)?;
    info!(
        command_uuid = %payload.uuid,
        success = payload.success,
        error_code = ?payload.error_code,
        "device confirmed a command"
    );

    let Some(command) =
        CommandRepository::find_by_uuid(&env.tenant_id, payload.uuid, &ctx.db).await?
    else {
        ctx.metrics.incr_confirms_rejected();
        warn!(
            command_uuid = %payload.uuid,
            "confirmation for a command that does not exist in this tenant"
        );
        return Ok(());
    };

    if command.state.is_terminal() {
        debug!(command_uuid = %command.uuid, "duplicate confirmation for terminal command");
        return Ok(());
    }

    let state = if payload.success {
        CommandState::Executed
    } else {
        CommandState::Error
    };
    CommandRepository::set_state(command.uuid, state, payload.error_code, &ctx.db).await?;
    Ok(())
}

/// Record the device-reported container state on the assignment slot.
///
/// The device is authoritative for final container state, but only within
/// its allowed vocabulary: `up`, `down`, `error`. Anything else is rejected
/// rather than stored verbatim.
pub async fn handle_container_confirm(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: ContainerConfirmPayload = parse_payload(ctx, env)?;
    info!(
        device_uuid = %payload.uuid,
        state = %payload.state,
        error_code = ?payload.error_code,
        "device confirmed its container state"
    );

    let state = match payload.state.parse::<DeploymentState>() {
        Ok(state) if state.is_device_reportable() => state,
        _ => {
            ctx.metrics.incr_confirms_rejected();
            warn!(
                state = %payload.state,
                "device reported an illegal deployment state"
            );
            return Ok(());
        }
    };

    let Some(assignment) =
        DeploymentRepository::find_by_device(&env.tenant_id, payload.uuid, &ctx.db).await?
    else {
        ctx.metrics.incr_confirms_rejected();
        warn!(
            device_uuid = %payload.uuid,
            "container confirmation for a device with no assignment in this tenant"
        );
        return Ok(());
    };

    DeploymentRepository::set_state(assignment.uuid, state, payload.error_code, &ctx.db).await?;
    Ok(())
}

/// Append a log record and advance the device's aggregate counters in one
/// transaction.
pub async fn handle_logs_ingest(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: LogIngestPayload = parse_payload(ctx, env)?;
    debug!(device_id = %env.device_id, "device sent a log record");

    let record = LogRecordModel {
        uuid: Uuid::new_v4(),
        tenant_id: env.tenant_id.clone(),
        device_uuid: env.device_uuid,
        stamp: payload.stamp,
        level: payload.level,
        name: payload.name,
        file: payload.file,
        function: payload.function,
        line: payload.line,
        msg: payload.msg,
        created_at: Utc::now(),
    };

    let txn = ctx.db.begin().await.map_err(SyncError::from)?;
    LogRecordRepository::create_many(vec![record], &txn).await?;
    DeviceRepository::bump_log_counters(env.device_uuid, 1, payload.stamp, &txn).await?;
    txn.commit().await.map_err(SyncError::from)?;
    Ok(())
}

/// Append a vitals sample. Persistence failure is logged and swallowed; the
/// channel is qos 0 and the device does not expect a failure signal.
pub async fn handle_vitals_ingest(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: VitalsIngestPayload = parse_payload(ctx, env)?;
    debug!(device_id = %env.device_id, "device sent a vitals sample");

    let vital = VitalModel {
        uuid: Uuid::new_v4(),
        tenant_id: env.tenant_id.clone(),
        device_uuid: env.device_uuid,
        battery: payload.battery,
        cpu: payload.cpu,
        ram: payload.ram,
        disk: payload.disk,
        created_at: Utc::now(),
    };

    if let Err(e) = VitalRepository::create(vital, &ctx.db).await {
        error!(error = %e, "could not persist vitals sample");
    }
    Ok(())
}

/// Append a data point and advance the stream's counters atomically.
///
/// The point insert and the counter updates commit together; a point
/// without counters (or the reverse) must never be observable.
pub async fn handle_data_ingest(ctx: &SyncContext, env: &Envelope) -> SyncResult<()> {
    let payload: DataIngestPayload = parse_payload(ctx, env)?;
    debug!(device_id = %env.device_id, source = %payload.source, "device sent a data point");

    let Some(stream) =
        StreamRepository::find_by_source(env.device_uuid, &payload.source, &ctx.db).await?
    else {
        warn!(
            source = %payload.source,
            "device uploaded data for a stream that does not exist"
        );
        return Ok(());
    };

    if !stream.enabled {
        // The device may be lagging a disable push.
        warn!(source = %payload.source, "device uploaded data for a disabled stream");
        return Ok(());
    }

    let point = DataPointModel {
        uuid: Uuid::new_v4(),
        tenant_id: env.tenant_id.clone(),
        device_uuid: env.device_uuid,
        stream_uuid: stream.uuid,
        sent_at: payload.sent_at,
        payload: payload.payload,
        created_at: Utc::now(),
    };

    let txn = ctx.db.begin().await.map_err(SyncError::from)?;
    DataPointRepository::create(point, &txn).await?;
    StreamRepository::bump_counters(stream.uuid, payload.sent_at, &txn).await?;
    txn.commit().await.map_err(SyncError::from)?;
    Ok(())
}
