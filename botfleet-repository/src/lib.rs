//! Data access layer.
//!
//! Every repository method takes the connection it should run on, so callers
//! can pass a pooled connection or an open transaction interchangeably.

mod command;
mod compose_file;
mod data_point;
mod deployment;
mod device;
mod log_record;
mod stream;
mod vital;

pub use command::CommandRepository;
pub use compose_file::ComposeFileRepository;
pub use data_point::DataPointRepository;
pub use deployment::DeploymentRepository;
pub use device::DeviceRepository;
pub use log_record::LogRecordRepository;
pub use stream::StreamRepository;
pub use vital::VitalRepository;
