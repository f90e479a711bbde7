use botfleet_error::StorageResult;
use botfleet_models::{
    entities::command::{Column as CommandColumn, Entity as Command, Model as CommandModel},
    enums::CommandState,
};
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
};
use uuid::Uuid;

/// Repository for command operations
pub struct CommandRepository;

impl CommandRepository {
    pub async fn create<C>(command: CommandModel, db: &C) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Command::insert(command.into_active_model())
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    pub async fn find_by_uuid<C>(
        tenant_id: &str,
        uuid: Uuid,
        db: &C,
    ) -> StorageResult<Option<CommandModel>>
    where
        C: ConnectionTrait,
    {
        Ok(Command::find_by_id(uuid)
            .filter(CommandColumn::TenantId.eq(tenant_id))
            .one(db)
            .await?)
    }

    pub async fn set_state<C>(
        uuid: Uuid,
        state: CommandState,
        error_code: Option<String>,
        db: &C,
    ) -> StorageResult<()>
    where
        C: ConnectionTrait,
    {
        Command::update_many()
            .col_expr(CommandColumn::State, Expr::value(state))
            .col_expr(CommandColumn::ErrorCode, Expr::value(error_code))
            .filter(CommandColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(())
    }

    pub async fn delete<C>(tenant_id: &str, uuid: Uuid, db: &C) -> StorageResult<u64>
    where
        C: ConnectionTrait,
    {
        let res = Command::delete_many()
            .filter(CommandColumn::TenantId.eq(tenant_id))
            .filter(CommandColumn::Uuid.eq(uuid))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
