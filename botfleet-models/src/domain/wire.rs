//! JSON payloads exchanged with devices over the broker.
//!
//! Inbound payloads are what devices publish; outbound payloads are what the
//! server publishes back on the per-device config and command channels. Field
//! names follow the on-wire contract, so `kind` is renamed to `type` where the
//! devices expect it.

use crate::enums::CommandInterface;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Retained presence flag published by the device (and by its LWT).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    pub online: bool,
    #[serde(default)]
    pub agent_version: Option<String>,
}

/// Device acknowledgement for a previously sent command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfirmPayload {
    pub uuid: Uuid,
    pub success: bool,
    #[serde(default)]
    pub error_code: Option<String>,
}

/// Device report of its container deployment outcome.
///
/// `state` stays a raw string here; only a subset of deployment states is
/// legal from a device and the sync layer enforces that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfirmPayload {
    pub uuid: Uuid,
    pub state: String,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogIngestPayload {
    pub stamp: DateTime<Utc>,
    pub level: String,
    pub name: String,
    pub file: String,
    pub function: String,
    pub line: i32,
    pub msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalsIngestPayload {
    pub battery: f64,
    pub cpu: f64,
    pub ram: f64,
    pub disk: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIngestPayload {
    pub source: String,
    pub sent_at: DateTime<Utc>,
    pub payload: Value,
}

/// Command pushed to a device on its `commands/send` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSendPayload {
    pub uuid: Uuid,
    pub interface: CommandInterface,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Value,
}

/// Desired container workload pushed on `containers/config`.
///
/// `compose: None` instructs the device to tear its workload down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfigPayload {
    pub uuid: Uuid,
    pub compose: Option<Value>,
}

/// Enable/disable toggle for the logs and vitals channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfigPayload {
    pub enabled: bool,
}

/// One stream entry in the `data/config` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfigItem {
    pub uuid: Uuid,
    pub source: String,
    pub hz: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_tolerates_missing_agent_version() {
        let payload: PresencePayload = serde_json::from_value(json!({"online": true})).unwrap();
        assert!(payload.online);
        assert!(payload.agent_version.is_none());
    }

    #[test]
    fn command_send_uses_type_on_the_wire() {
        let payload = CommandSendPayload {
            uuid: Uuid::new_v4(),
            interface: CommandInterface::Topic,
            name: "/cmd_vel".into(),
            kind: "geometry_msgs/msg/Twist".into(),
            payload: json!({"linear": {"x": 0.5}}),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "geometry_msgs/msg/Twist");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn container_config_serializes_explicit_null_compose() {
        let payload = ContainerConfigPayload {
            uuid: Uuid::new_v4(),
            compose: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["compose"].is_null());
    }
}
