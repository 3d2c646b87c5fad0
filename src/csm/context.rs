use std::fmt;

use serde::{Deserialize, Serialize};

/// A named context variable; `value` is an expression string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub name: String,
    pub value: String,
}

impl ContextVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Visibility category of a context variable, i.e. which list of its owner stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    Local,
    Persistent,
    Static,
}

impl ContextType {
    pub const ALL: [ContextType; 3] = [Self::Local, Self::Persistent, Self::Static];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Persistent => "persistent",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
