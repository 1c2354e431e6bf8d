//! Operator commands sent back to the instrument

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Control command understood by the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Start logging measurements
    Start,
    /// Stop logging measurements
    Stop,
    Restart,
    PowerOff,
}

/// Outbound message envelope: `{"type":"command","command":"start"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    Command { command: Command },
}

impl Command {
    pub const ALL: [Command; 4] = [Self::Start, Self::Stop, Self::Restart, Self::PowerOff];

    /// Button caption on the CMD tab
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "START LOG",
            Self::Stop => "STOP LOG",
            Self::Restart => "RESET",
            Self::PowerOff => "POWER OFF",
        }
    }

    pub fn message(self) -> Outbound {
        Outbound::Command { command: self }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::PowerOff => "poweroff",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command '{0}' (expected start, stop, restart or poweroff)")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" | "reset" => Ok(Self::Restart),
            "poweroff" | "power-off" => Ok(Self::PowerOff),
            _ => Err(UnknownCommand(s.trim().to_string())),
        }
    }
}
