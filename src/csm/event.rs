use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::ContextVariable;

/// Channel an event travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventChannel {
    /// Stays inside the raising state machine
    #[default]
    Internal,
    /// Delivered to other state machines of the same CSM
    External,
    /// Broadcast to every state machine
    Global,
    /// Exchanged with the environment
    Peripheral,
}

impl EventChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Global => "global",
            Self::Peripheral => "peripheral",
        }
    }

    /// Whether events on this channel can reach another state machine of the same CSM.
    pub fn crosses_machines(self) -> bool {
        matches!(self, Self::External | Self::Global)
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventChannelError(pub String);

impl fmt::Display for ParseEventChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid event channel: {:?}", self.0)
    }
}

impl std::error::Error for ParseEventChannelError {}

impl FromStr for EventChannel {
    type Err = ParseEventChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "global" => Ok(Self::Global),
            "peripheral" => Ok(Self::Peripheral),
            other => Err(ParseEventChannelError(other.to_owned())),
        }
    }
}

/// An event, optionally carrying context data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub channel: EventChannel,
    pub data: Vec<ContextVariable>,
}

impl Event {
    pub fn new(name: impl Into<String>, channel: EventChannel) -> Self {
        Self {
            name: name.into(),
            channel,
            data: Vec::new(),
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self::new(name, EventChannel::Internal)
    }

    pub fn with_data(mut self, variable: ContextVariable) -> Self {
        self.data.push(variable);
        self
    }
}
