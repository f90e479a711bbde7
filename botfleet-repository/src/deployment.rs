use botfleet_error::StorageResult;
use botfleet_models::{
    entities::deployment::{
        Column as DeploymentColumn, Entity as Deployment, Model as DeploymentModel,
    },
    enums::DeploymentState,
};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter,
};
use uuid::Uuid;

/// Repository for deployment assignment operations
pub struct DeploymentRepository;

impl DeploymentRepository {
    pub async fn create<C>(deployment: DeploymentModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Deployment::insert(deployment.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// The single assignment slot for a device, if occupied
    pub async fn find_by_device<C>(
        tenant_id: &str,
        device_uuid: Uuid,
        db: &C,
    ) -> StorageResult<Option<DeploymentModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Deployment::find()
            .filter(DeploymentColumn::TenantId.eq(tenant_id))
            .filter(DeploymentColumn::DeviceUuid.eq(device_uuid))
            .one(db)
            .await?)
    }

    pub async fn set_state<C>(
        uuid: Uuid,
        state: DeploymentState,
        error_code: Option<String>,
        db: &C,
    ) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Deployment::update_many()
            .col_expr(DeploymentColumn::State, Expr::value(state))
            .col_expr(DeploymentColumn::ErrorCode, Expr::value(error_code))
            .filter(DeploymentColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Point an existing assignment slot at a new compose file
    pub async fn retarget<C>(
        uuid: Uuid,
        compose_file_uuid: Uuid,
        state: DeploymentState,
        db: &C,
    ) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Deployment::update_many()
            .col_expr(
                DeploymentColumn::ComposeFileUuid,
                Expr::value(compose_file_uuid),
            )
            .col_expr(DeploymentColumn::State, Expr::value(state))
            .col_expr(DeploymentColumn::ErrorCode, Expr::value(None::<String>))
            .filter(DeploymentColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete<C>(uuid: Uuid, db: &C) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        let res = Deployment::delete_many()
            .filter(DeploymentColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }

    /// Assignments referencing a compose file that have not converged to
    /// `down`. Deleting the file while any exist would orphan a device.
    pub async fn count_undrained_by_compose_file<C>(
        compose_file_uuid: Uuid,
        db: &C,
    ) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        Ok(Deployment::find()
            .filter(DeploymentColumn::ComposeFileUuid.eq(compose_file_uuid))
            .filter(DeploymentColumn::State.ne(DeploymentState::Down))
            .count(db)
            .await?)
    }
}
