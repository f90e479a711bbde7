use botfleet_error::StorageResult;
use botfleet_models::entities::data_point::{Entity as DataPoint, Model as DataPointModel};
use sea_orm::{ConnectionTrait, EntityTrait, IntoActiveModel};

/// Repository for stream data points
pub struct DataPointRepository;

impl DataPointRepository {
    pub async fn create<C>(point: DataPointModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        DataPoint::insert(point.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}
