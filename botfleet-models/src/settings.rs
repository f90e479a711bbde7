use botfleet_error::FleetResult;
use config::{Config, File};
use serde::{self, Deserialize};
use std::{ops::Deref, sync::Arc};

use crate::constants::DATA_DIR;

#[derive(Debug, Clone)]
pub struct Settings(Arc<Inner>);

impl Deref for Settings {
    type Target = Inner;
    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Settings {
    pub fn new(config_path: String) -> FleetResult<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(config_path.as_str()).required(false))
            .add_source(
                config::Environment::with_prefix("BOTFLEET")
                    .separator("__")
                    .try_parsing(true),
            );
        let inner: Inner = builder.build()?.try_deserialize()?;
        Ok(Self(Arc::new(inner)))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Inner {
    #[serde(default)]
    pub mqtt: Mqtt,
    #[serde(default)]
    pub sync: Sync,
    #[serde(default)]
    pub db: Db,
    #[serde(default)]
    pub log: Log,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mqtt {
    #[serde(default = "Mqtt::host_default")]
    pub host: String,
    #[serde(default = "Mqtt::port_default")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "Mqtt::client_id_default")]
    pub client_id: String,
    #[serde(default = "Mqtt::keep_alive_secs_default")]
    pub keep_alive_secs: u64,
    /// Time allowed for the broker to acknowledge a fresh session.
    #[serde(default = "Mqtt::connect_timeout_ms_default")]
    pub connect_timeout_ms: u64,
    /// Fixed delay between reconnect attempts. Not a backoff.
    #[serde(default = "Mqtt::reconnect_period_ms_default")]
    pub reconnect_period_ms: u64,
    #[serde(default = "Mqtt::event_channel_capacity_default")]
    pub event_channel_capacity: usize,
}

impl Default for Mqtt {
    fn default() -> Self {
        Mqtt {
            host: Mqtt::host_default(),
            port: Mqtt::port_default(),
            username: None,
            password: None,
            client_id: Mqtt::client_id_default(),
            keep_alive_secs: Mqtt::keep_alive_secs_default(),
            connect_timeout_ms: Mqtt::connect_timeout_ms_default(),
            reconnect_period_ms: Mqtt::reconnect_period_ms_default(),
            event_channel_capacity: Mqtt::event_channel_capacity_default(),
        }
    }
}

impl Mqtt {
    fn host_default() -> String {
        "localhost".into()
    }

    fn port_default() -> u16 {
        1883
    }

    fn client_id_default() -> String {
        "botfleet".into()
    }

    fn keep_alive_secs_default() -> u64 {
        30
    }

    fn connect_timeout_ms_default() -> u64 {
        10_000
    }

    fn reconnect_period_ms_default() -> u64 {
        5000
    }

    fn event_channel_capacity_default() -> usize {
        100
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sync {
    /// Per-device mailbox depth. Dispatch backpressures when a device
    /// worker falls this far behind.
    #[serde(default = "Sync::worker_queue_capacity_default")]
    pub worker_queue_capacity: usize,
}

impl Default for Sync {
    fn default() -> Self {
        Sync {
            worker_queue_capacity: Sync::worker_queue_capacity_default(),
        }
    }
}

impl Sync {
    fn worker_queue_capacity_default() -> usize {
        256
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Db {
    #[serde(default)]
    pub sqlite: Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sqlite {
    #[serde(default = "Sqlite::path_default")]
    pub path: String,
    #[serde(default = "Sqlite::timeout_default")]
    pub timeout: u64,
    #[serde(default = "Sqlite::idle_timeout_default")]
    pub idle_timeout: u64,
    #[serde(default = "Sqlite::max_lifetime_default")]
    pub max_lifetime: u64,
    #[serde(default = "Sqlite::max_connections_default")]
    pub max_connections: u32,
    #[serde(default = "Sqlite::auto_create_default")]
    pub auto_create: bool,
}

impl Default for Sqlite {
    fn default() -> Self {
        Sqlite {
            path: Sqlite::path_default(),
            timeout: Sqlite::timeout_default(),
            idle_timeout: Sqlite::idle_timeout_default(),
            max_lifetime: Sqlite::max_lifetime_default(),
            max_connections: Sqlite::max_connections_default(),
            auto_create: Sqlite::auto_create_default(),
        }
    }
}

impl Sqlite {
    pub fn to_url(&self) -> String {
        if self.auto_create {
            // mode=rwc creates the file on first open
            format!("sqlite:{}/{}?mode=rwc", DATA_DIR, self.path)
        } else {
            format!("sqlite:{}/{}", DATA_DIR, self.path)
        }
    }

    pub fn db_dir(&self) -> String {
        DATA_DIR.into()
    }

    fn path_default() -> String {
        "botfleet.db".into()
    }

    fn timeout_default() -> u64 {
        5000
    }

    fn idle_timeout_default() -> u64 {
        5000
    }

    fn max_lifetime_default() -> u64 {
        5000
    }

    fn max_connections_default() -> u32 {
        100
    }

    fn auto_create_default() -> bool {
        true
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    #[serde(default = "Log::level_default")]
    pub level: String,
    #[serde(default = "Log::directory_default")]
    pub directory: String,
}

impl Default for Log {
    fn default() -> Self {
        Log {
            level: Log::level_default(),
            directory: Log::directory_default(),
        }
    }
}

impl Log {
    fn level_default() -> String {
        "info".into()
    }

    fn directory_default() -> String {
        "logs".into()
    }
}
