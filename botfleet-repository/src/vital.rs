use botfleet_error::StorageResult;
use botfleet_models::entities::vital::{Entity as Vital, Model as VitalModel};
use sea_orm::{ConnectionTrait, EntityTrait, IntoActiveModel};

/// Repository for vitals samples
pub struct VitalRepository;

impl VitalRepository {
    pub async fn create<C>(vital: VitalModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Vital::insert(vital.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}
