use botfleet_error::StorageResult;
use botfleet_models::entities::compose_file::{
    Column as ComposeFileColumn, Entity as ComposeFile, Model as ComposeFileModel,
};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter};
use uuid::Uuid;

/// Repository for compose file operations
pub struct ComposeFileRepository;

impl ComposeFileRepository {
    pub async fn create<C>(compose_file: ComposeFileModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        ComposeFile::insert(compose_file.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn find_by_uuid<C>(
        tenant_id: &str,
        uuid: Uuid,
        db: &C,
    ) -> StorageResult<Option<ComposeFileModel>>
    where
        C: ConnectionTrait,
    {
        Ok(ComposeFile::find_by_id(uuid)
            .filter(ComposeFileColumn::TenantId.eq(tenant_id))
            .one(db)
            .await?)
    }

    pub async fn find_by_slug<C>(
        tenant_id: &str,
        slug: &str,
        db: &C,
    ) -> StorageResult<Option<ComposeFileModel>>
    where
        C: ConnectionTrait,
    {
        Ok(ComposeFile::find()
            .filter(ComposeFileColumn::TenantId.eq(tenant_id))
            .filter(ComposeFileColumn::Id.eq(slug))
            .one(db)
            .await?)
    }

    pub async fn delete<C>(tenant_id: &str, uuid: Uuid, db: &C) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        let res = ComposeFile::delete_many()
            .filter(ComposeFileColumn::TenantId.eq(tenant_id))
            .filter(ComposeFileColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
