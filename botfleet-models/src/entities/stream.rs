//! `SeaORM` entity for data collection streams.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stream")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub tenant_id: String,
    pub device_uuid: Uuid,
    /// Unique per device.
    pub source: String,
    /// `type` on the wire.
    pub kind: String,
    pub hz: f64,
    pub enabled: bool,
    /// Set once, by the first accepted data point.
    pub first_recording: Option<DateTimeUtc>,
    pub last_recording: Option<DateTimeUtc>,
    pub num_recordings: i64,
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
    #[sea_orm(has_many = "super::data_point::Entity")]
    DataPoint,
}

impl Related<super::device::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Device.def()
    }
}

impl Related<super::data_point::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DataPoint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
