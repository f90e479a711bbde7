use botfleet_error::StorageResult;
use botfleet_models::entities::stream::{
    ActiveModel as StreamActiveModel, Column as StreamColumn, Entity as Stream,
    Model as StreamModel,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Repository for data stream operations
pub struct StreamRepository;

impl StreamRepository {
    pub async fn create<C>(stream: StreamModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Stream::insert(stream.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn find_by_uuid<C>(
        tenant_id: &str,
        uuid: Uuid,
        db: &C,
    ) -> StorageResult<Option<StreamModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Stream::find_by_id(uuid)
            .filter(StreamColumn::TenantId.eq(tenant_id))
            .one(db)
            .await?)
    }

    pub async fn find_by_source<C>(
        device_uuid: Uuid,
        source: &str,
        db: &C,
    ) -> StorageResult<Option<StreamModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Stream::find()
            .filter(StreamColumn::DeviceUuid.eq(device_uuid))
            .filter(StreamColumn::Source.eq(source))
            .one(db)
            .await?)
    }

    /// All streams configured for a device, stable order for config payloads
    pub async fn find_by_device<C>(device_uuid: Uuid, db: &C) -> StorageResult<Vec<StreamModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Stream::find()
            .filter(StreamColumn::DeviceUuid.eq(device_uuid))
            .order_by_asc(StreamColumn::CreatedAt)
            .all(db)
            .await?)
    }

    /// Enabled streams only, the shape of a data-config push
    pub async fn find_enabled_by_device<C>(
        device_uuid: Uuid,
        db: &C,
    ) -> StorageResult<Vec<StreamModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Stream::find()
            .filter(StreamColumn::DeviceUuid.eq(device_uuid))
            .filter(StreamColumn::Enabled.eq(true))
            .order_by_asc(StreamColumn::CreatedAt)
            .all(db)
            .await?)
    }

    pub async fn update<C>(stream: StreamActiveModel, db: &C) -> StorageResult<StreamModel>
    where
        C: ConnectionTrait,
    {
        Ok(stream.update(db).await?)
    }

    pub async fn delete<C>(uuid: Uuid, db: &C) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        let res = Stream::delete_many()
            .filter(StreamColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    /// Advance the ingest counters by one accepted data point
    pub async fn bump_counters<C>(uuid: Uuid, at: DateTime<Utc>, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Stream::update_many()
            .col_expr(
                StreamColumn::NumRecordings,
                Expr::col(StreamColumn::NumRecordings).add(1),
            )
            .col_expr(StreamColumn::LastRecording, Expr::value(Some(at)))
            .filter(StreamColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        // first_recording is write-once
        Stream::update_many()
            .col_expr(StreamColumn::FirstRecording, Expr::value(Some(at)))
            .filter(StreamColumn::Uuid.eq(uuid))
            .filter(StreamColumn::FirstRecording.is_null())
            .exec(db)
            .await?;
        Ok(())
    }
}
