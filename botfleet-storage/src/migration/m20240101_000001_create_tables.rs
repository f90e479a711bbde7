use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_tables(manager).await?;
        create_indexes(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Table::drop().table(DataPoint::Table).to_owned(),
            Table::drop().table(Vital::Table).to_owned(),
            Table::drop().table(LogRecord::Table).to_owned(),
            Table::drop().table(Stream::Table).to_owned(),
            Table::drop().table(Deployment::Table).to_owned(),
            Table::drop().table(ComposeFile::Table).to_owned(),
            Table::drop().table(Command::Table).to_owned(),
            Table::drop().table(Device::Table).to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}

async fn create_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Device::Table)
                .if_not_exists()
                .col(ColumnDef::new(Device::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Device::Id).string_len(30).not_null())
                .col(ColumnDef::new(Device::TenantId).string_len(36).not_null())
                .col(ColumnDef::new(Device::Name).string().not_null())
                .col(
                    ColumnDef::new(Device::Provisioned)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Device::Online)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(Device::OnlineUpdatedAt).timestamp_with_time_zone())
                .col(ColumnDef::new(Device::AgentVersion).string())
                .col(
                    ColumnDef::new(Device::LogsEnabled)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(ColumnDef::new(Device::LogsFirstRecording).timestamp_with_time_zone())
                .col(ColumnDef::new(Device::LogsLastRecording).timestamp_with_time_zone())
                .col(
                    ColumnDef::new(Device::LogsNumRecordings)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Device::VitalsEnabled)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Device::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Command::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Command::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Command::TenantId).string_len(36).not_null())
                .col(ColumnDef::new(Command::DeviceUuid).uuid().not_null())
                .col(ColumnDef::new(Command::Interface).string_len(20).not_null())
                .col(ColumnDef::new(Command::Name).string().not_null())
                .col(ColumnDef::new(Command::Kind).string().not_null())
                .col(ColumnDef::new(Command::Payload).json_binary().not_null())
                .col(ColumnDef::new(Command::State).string_len(20).not_null())
                .col(ColumnDef::new(Command::ErrorCode).string())
                .col(
                    ColumnDef::new(Command::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Command::Table, Command::DeviceUuid)
                        .to(Device::Table, Device::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(ComposeFile::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(ComposeFile::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(ComposeFile::Id).string_len(64).not_null())
                .col(
                    ColumnDef::new(ComposeFile::TenantId)
                        .string_len(36)
                        .not_null(),
                )
                .col(ColumnDef::new(ComposeFile::Name).string().not_null())
                .col(
                    ColumnDef::new(ComposeFile::Content)
                        .json_binary()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(ComposeFile::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Deployment::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Deployment::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(Deployment::TenantId)
                        .string_len(36)
                        .not_null(),
                )
                .col(ColumnDef::new(Deployment::DeviceUuid).uuid().not_null())
                .col(
                    ColumnDef::new(Deployment::ComposeFileUuid)
                        .uuid()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Deployment::State)
                        .string_len(20)
                        .not_null(),
                )
                .col(ColumnDef::new(Deployment::ErrorCode).string())
                .col(
                    ColumnDef::new(Deployment::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Deployment::Table, Deployment::DeviceUuid)
                        .to(Device::Table, Device::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Deployment::Table, Deployment::ComposeFileUuid)
                        .to(ComposeFile::Table, ComposeFile::Uuid)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Stream::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Stream::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Stream::TenantId).string_len(36).not_null())
                .col(ColumnDef::new(Stream::DeviceUuid).uuid().not_null())
                .col(ColumnDef::new(Stream::Source).string().not_null())
                .col(ColumnDef::new(Stream::Kind).string().not_null())
                .col(ColumnDef::new(Stream::Hz).double().not_null())
                .col(
                    ColumnDef::new(Stream::Enabled)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(ColumnDef::new(Stream::FirstRecording).timestamp_with_time_zone())
                .col(ColumnDef::new(Stream::LastRecording).timestamp_with_time_zone())
                .col(
                    ColumnDef::new(Stream::NumRecordings)
                        .big_integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Stream::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Stream::Table, Stream::DeviceUuid)
                        .to(Device::Table, Device::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(LogRecord::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(LogRecord::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(LogRecord::TenantId)
                        .string_len(36)
                        .not_null(),
                )
                .col(ColumnDef::new(LogRecord::DeviceUuid).uuid().not_null())
                .col(
                    ColumnDef::new(LogRecord::Stamp)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(ColumnDef::new(LogRecord::Level).string_len(16).not_null())
                .col(ColumnDef::new(LogRecord::Name).string().not_null())
                .col(ColumnDef::new(LogRecord::File).string().not_null())
                .col(ColumnDef::new(LogRecord::Function).string().not_null())
                .col(ColumnDef::new(LogRecord::Line).integer().not_null())
                .col(ColumnDef::new(LogRecord::Msg).text().not_null())
                .col(
                    ColumnDef::new(LogRecord::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(LogRecord::Table, LogRecord::DeviceUuid)
                        .to(Device::Table, Device::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Vital::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Vital::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Vital::TenantId).string_len(36).not_null())
                .col(ColumnDef::new(Vital::DeviceUuid).uuid().not_null())
                .col(ColumnDef::new(Vital::Battery).double().not_null())
                .col(ColumnDef::new(Vital::Cpu).double().not_null())
                .col(ColumnDef::new(Vital::Ram).double().not_null())
                .col(ColumnDef::new(Vital::Disk).double().not_null())
                .col(
                    ColumnDef::new(Vital::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(Vital::Table, Vital::DeviceUuid)
                        .to(Device::Table, Device::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(DataPoint::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(DataPoint::Uuid)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(DataPoint::TenantId)
                        .string_len(36)
                        .not_null(),
                )
                .col(ColumnDef::new(DataPoint::DeviceUuid).uuid().not_null())
                .col(ColumnDef::new(DataPoint::StreamUuid).uuid().not_null())
                .col(
                    ColumnDef::new(DataPoint::SentAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(ColumnDef::new(DataPoint::Payload).json_binary().not_null())
                .col(
                    ColumnDef::new(DataPoint::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(DataPoint::Table, DataPoint::StreamUuid)
                        .to(Stream::Table, Stream::Uuid)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    Ok(())
}

async fn create_indexes(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .name("idx_device_id_tenant")
                .table(Device::Table)
                .col(Device::Id)
                .col(Device::TenantId)
                .unique()
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("idx_compose_file_id_tenant")
                .table(ComposeFile::Table)
                .col(ComposeFile::Id)
                .col(ComposeFile::TenantId)
                .unique()
                .to_owned(),
        )
        .await?;
    // one assignment slot per device
    manager
        .create_index(
            Index::create()
                .name("idx_deployment_tenant_device")
                .table(Deployment::Table)
                .col(Deployment::TenantId)
                .col(Deployment::DeviceUuid)
                .unique()
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("idx_stream_device_source")
                .table(Stream::Table)
                .col(Stream::DeviceUuid)
                .col(Stream::Source)
                .unique()
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("idx_command_device")
                .table(Command::Table)
                .col(Command::DeviceUuid)
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("idx_log_record_device")
                .table(LogRecord::Table)
                .col(LogRecord::DeviceUuid)
                .to_owned(),
        )
        .await?;
    manager
        .create_index(
            Index::create()
                .name("idx_data_point_stream")
                .table(DataPoint::Table)
                .col(DataPoint::StreamUuid)
                .to_owned(),
        )
        .await?;
    Ok(())
}

#[derive(DeriveIden)]
enum Device {
    Table,
    Uuid,
    Id,
    TenantId,
    Name,
    Provisioned,
    Online,
    OnlineUpdatedAt,
    AgentVersion,
    LogsEnabled,
    LogsFirstRecording,
    LogsLastRecording,
    LogsNumRecordings,
    VitalsEnabled,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Command {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    Interface,
    Name,
    Kind,
    Payload,
    State,
    ErrorCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ComposeFile {
    Table,
    Uuid,
    Id,
    TenantId,
    Name,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Deployment {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    ComposeFileUuid,
    State,
    ErrorCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Stream {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    Source,
    Kind,
    Hz,
    Enabled,
    FirstRecording,
    LastRecording,
    NumRecordings,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LogRecord {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    Stamp,
    Level,
    Name,
    File,
    Function,
    Line,
    Msg,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Vital {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    Battery,
    Cpu,
    Ram,
    Disk,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DataPoint {
    Table,
    Uuid,
    TenantId,
    DeviceUuid,
    StreamUuid,
    SentAt,
    Payload,
    CreatedAt,
}
