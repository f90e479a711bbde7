//! `SeaORM` entity for fleet devices.
//!
//! A device is identified by `(id, tenant_id)` on the wire and by `uuid`
//! internally. Presence and telemetry ingest mutate the aggregate fields;
//! the row itself is created by provisioning, outside the sync engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "device")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    /// Wire-facing slug, unique within the tenant.
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Set true on the first presence message, never reset.
    pub provisioned: bool,
    pub online: bool,
    /// Server receipt time of the last presence message. Device clocks are
    /// not trusted for this field.
    pub online_updated_at: Option<DateTimeUtc>,
    pub agent_version: Option<String>,
    pub logs_enabled: bool,
    pub logs_first_recording: Option<DateTimeUtc>,
    pub logs_last_recording: Option<DateTimeUtc>,
    pub logs_num_recordings: i64,
    pub vitals_enabled: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::command::Entity")]
    Command,
    #[sea_orm(has_many = "super::stream::Entity")]
    Stream,
    #[sea_orm(has_many = "super::log_record::Entity")]
    LogRecord,
    #[sea_orm(has_many = "super::vital::Entity")]
    Vital,
    #[sea_orm(has_one = "super::deployment::Entity")]
    Deployment,
}

impl Related<super::command::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Command.def()
    }
}

impl Related<super::stream::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stream.def()
    }
}

impl Related<super::log_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LogRecord.def()
    }
}

impl Related<super::vital::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vital.def()
    }
}

impl Related<super::deployment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deployment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
