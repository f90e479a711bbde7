use botfleet_error::StorageResult;
use botfleet_models::entities::log_record::{
    Column as LogRecordColumn, Entity as LogRecord, Model as LogRecordModel,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter};
use uuid::Uuid;

/// Repository for log record operations
pub struct LogRecordRepository;

impl LogRecordRepository {
    pub async fn create_many<C>(records: Vec<LogRecordModel>, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        if records.is_empty() {
            return Ok(());
        }
        LogRecord::insert_many(records.into_iter().map(IntoActiveModel::into_active_model))
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn delete_by_device<C>(device_uuid: Uuid, db: &C) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        let res = LogRecord::delete_many()
            .filter(LogRecordColumn::DeviceUuid.eq(device_uuid))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
