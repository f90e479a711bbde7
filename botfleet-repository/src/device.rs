use botfleet_error::StorageResult;
use botfleet_models::entities::device::{
    ActiveModel as DeviceActiveModel, Column as DeviceColumn, Entity as Device,
    Model as DeviceModel,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter,
};
use uuid::Uuid;

/// Repository for device operations
pub struct DeviceRepository;

impl DeviceRepository {
    /// Create new device
    pub async fn create<C>(device: DeviceModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Device::insert(device.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Find device by UUID
    pub async fn find_by_uuid<C>(uuid: Uuid, db: &C) -> StorageResult<Option<DeviceModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Device::find_by_id(uuid).one(db).await?)
    }

    /// Find device by wire slug within a tenant
    pub async fn find_by_slug<C>(
        tenant_id: &str,
        slug: &str,
        db: &C,
    ) -> StorageResult<Option<DeviceModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Device::find()
            .filter(DeviceColumn::TenantId.eq(tenant_id))
            .filter(DeviceColumn::Id.eq(slug))
            .one(db)
            .await?)
    }

    /// Update existing device
    pub async fn update<C>(device: DeviceActiveModel, db: &C) -> StorageResult<DeviceModel>
    where
        C: ConnectionTrait,
    {
        Ok(device.update(db).await?)
    }

    /// Record a presence report. The first one a device ever sends is what
    /// marks it provisioned.
    pub async fn record_presence<C>(
        uuid: Uuid,
        online: bool,
        agent_version: Option<String>,
        at: DateTime<Utc>,
        db: &C,
    ) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        let mut update = Device::update_many()
            .col_expr(DeviceColumn::Provisioned, Expr::value(true))
            .col_expr(DeviceColumn::Online, Expr::value(online))
            .col_expr(DeviceColumn::OnlineUpdatedAt, Expr::value(Some(at)))
            .filter(DeviceColumn::Uuid.eq(uuid));
        if let Some(version) = agent_version {
            update = update.col_expr(DeviceColumn::AgentVersion, Expr::value(Some(version)));
        }
        update.exec(db).await?;
        Ok(())
    }

    pub async fn set_logs_enabled<C>(uuid: Uuid, enabled: bool, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Device::update_many()
            .col_expr(DeviceColumn::LogsEnabled, Expr::value(enabled))
            .filter(DeviceColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn set_vitals_enabled<C>(uuid: Uuid, enabled: bool, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Device::update_many()
            .col_expr(DeviceColumn::VitalsEnabled, Expr::value(enabled))
            .filter(DeviceColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Advance the log ingest counters by `count` accepted records
    pub async fn bump_log_counters<C>(
        uuid: Uuid,
        count: i64,
        at: DateTime<Utc>,
        db: &C,
    ) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Device::update_many()
            .col_expr(
                DeviceColumn::LogsNumRecordings,
                Expr::col(DeviceColumn::LogsNumRecordings).add(count),
            )
            .col_expr(DeviceColumn::LogsLastRecording, Expr::value(Some(at)))
            .filter(DeviceColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        // first_recording is write-once
        Device::update_many()
            .col_expr(DeviceColumn::LogsFirstRecording, Expr::value(Some(at)))
            .filter(DeviceColumn::Uuid.eq(uuid))
            .filter(DeviceColumn::LogsFirstRecording.is_null())
            .exec(db)
            .await?;
        Ok(())
    }

    /// Reset the log ingest counters after a purge
    pub async fn reset_log_counters<C>(uuid: Uuid, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Device::update_many()
            .col_expr(DeviceColumn::LogsNumRecordings, Expr::value(0i64))
            .col_expr(
                DeviceColumn::LogsFirstRecording,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(
                DeviceColumn::LogsLastRecording,
                Expr::value(None::<DateTime<Utc>>),
            )
            .filter(DeviceColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }
}
