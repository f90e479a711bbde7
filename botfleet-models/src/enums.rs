use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Lifecycle of an operator command.
///
/// `created` and `sent` are cloud-driven; the terminal states are reached
/// when the device confirms (or when the device was offline at send time).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(16))",
    rename_all = "snake_case"
)]
#[serde(rename_all = "snake_case")]
pub enum CommandState {
    Created,
    Sent,
    Executed,
    Error,
}

impl CommandState {
    /// Terminal commands never transition again; duplicate confirmations
    /// may reapply the same terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandState::Executed | CommandState::Error)
    }
}

/// Transport a command takes on the device side.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(20))",
    rename_all = "snake_case"
)]
#[serde(rename_all = "snake_case")]
pub enum CommandInterface {
    Topic,
    Service,
    ActionSendGoal,
}

/// State of the single container deployment slot per device.
///
/// `pending_*` states originate in the cloud; `up`, `down` and `error`
/// are reported by the device through `containers/confirm`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(16))",
    rename_all = "snake_case"
)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    PendingUp,
    Up,
    PendingDown,
    Down,
    Error,
}

impl DeploymentState {
    /// States a device is allowed to report. The pending states are
    /// cloud-owned; a device claiming one is a protocol violation.
    pub fn is_device_reportable(self) -> bool {
        matches!(
            self,
            DeploymentState::Up | DeploymentState::Down | DeploymentState::Error
        )
    }

    pub fn is_pending(self) -> bool {
        matches!(self, DeploymentState::PendingUp | DeploymentState::PendingDown)
    }
}

impl Display for DeploymentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentState::PendingUp => "pending_up",
            DeploymentState::Up => "up",
            DeploymentState::PendingDown => "pending_down",
            DeploymentState::Down => "down",
            DeploymentState::Error => "error",
        };
        f.write_str(s)
    }
}

impl FromStr for DeploymentState {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_up" => Ok(DeploymentState::PendingUp),
            "up" => Ok(DeploymentState::Up),
            "pending_down" => Ok(DeploymentState::PendingDown),
            "down" => Ok(DeploymentState::Down),
            "error" => Ok(DeploymentState::Error),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_command_states() {
        assert!(!CommandState::Created.is_terminal());
        assert!(!CommandState::Sent.is_terminal());
        assert!(CommandState::Executed.is_terminal());
        assert!(CommandState::Error.is_terminal());
    }

    #[test]
    fn device_reportable_deployment_states() {
        assert!(DeploymentState::Up.is_device_reportable());
        assert!(DeploymentState::Down.is_device_reportable());
        assert!(DeploymentState::Error.is_device_reportable());
        assert!(!DeploymentState::PendingUp.is_device_reportable());
        assert!(!DeploymentState::PendingDown.is_device_reportable());
    }

    #[test]
    fn deployment_state_round_trip() {
        for s in ["pending_up", "up", "pending_down", "down", "error"] {
            assert_eq!(s.parse::<DeploymentState>().unwrap().to_string(), s);
        }
        assert!("running".parse::<DeploymentState>().is_err());
    }
}
