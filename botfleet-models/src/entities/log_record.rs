//! `SeaORM` entity for ingested device log lines. Append-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "log_record")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub tenant_id: String,
    pub device_uuid: Uuid,
    /// Device-reported timestamp, distinct from server receipt time.
    pub stamp: DateTimeUtc,
    pub level: String,
    pub name: String,
    pub file: String,
    pub function: String,
    pub line: i32,
    pub msg: String,
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
}

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
