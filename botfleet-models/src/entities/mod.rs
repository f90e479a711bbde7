pub mod command;
pub mod compose_file;
pub mod data_point;
pub mod deployment;
pub mod device;
pub mod log_record;
pub mod stream;
pub mod vital;

pub mod prelude {
    pub use super::command::{
        ActiveModel as CommandActiveModel, Column as CommandColumn, Entity as Command,
        Model as CommandModel,
    };
    pub use super::compose_file::{
        ActiveModel as ComposeFileActiveModel, Column as ComposeFileColumn,
        Entity as ComposeFile, Model as ComposeFileModel,
    };
    pub use super::data_point::{
        ActiveModel as DataPointActiveModel, Column as DataPointColumn, Entity as DataPoint,
        Model as DataPointModel,
    };
    pub use super::deployment::{
        ActiveModel as DeploymentActiveModel, Column as DeploymentColumn, Entity as Deployment,
        Model as DeploymentModel,
    };
    pub use super::device::{
        ActiveModel as DeviceActiveModel, Column as DeviceColumn, Entity as Device,
        Model as DeviceModel,
    };
    pub use super::log_record::{
        ActiveModel as LogRecordActiveModel, Column as LogRecordColumn, Entity as LogRecord,
        Model as LogRecordModel,
    };
    pub use super::stream::{
        ActiveModel as StreamActiveModel, Column as StreamColumn, Entity as Stream,
        Model as StreamModel,
    };
    pub use super::vital::{
        ActiveModel as VitalActiveModel, Column as VitalColumn, Entity as Vital,
        Model as VitalModel,
    };
}
