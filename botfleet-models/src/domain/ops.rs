//! Operator-facing request types.
//!
//! These are what callers hand to the sync services; the services turn them
//! into rows and wire payloads.

use crate::enums::CommandInterface;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommand {
    pub interface: CommandInterface,
    pub name: String,
    pub kind: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComposeFile {
    pub id: String,
    pub name: String,
    pub content: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStream {
    pub source: String,
    pub kind: String,
    pub hz: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamUpdate {
    #[serde(default)]
    pub hz: Option<f64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}
