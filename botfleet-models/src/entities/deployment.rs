//! `SeaORM` entity for the container deployment assignment.
//!
//! At most one row per device (unique on `(tenant_id, device_uuid)`);
//! deploy requests upsert into the same slot.

use crate::enums::DeploymentState;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deployment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub tenant_id: String,
    pub device_uuid: Uuid,
    pub compose_file_uuid: Uuid,
    pub state: DeploymentState,
    pub error_code: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::device::Entity",
        from = "Column::DeviceUuid",
        to = "super::device::Column::Uuid"
    )]
    Device,
    #[sea_orm(
        belongs_to = "super::compose_file::Entity",
        from = "Column::ComposeFileUuid",
        to = "super::compose_file::Column::Uuid"
    )]
    ComposeFile,
}

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl Related<super::compose_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComposeFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
