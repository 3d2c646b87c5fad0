use super::Uid;

/// A guard condition for transitions.
#[derive(Debug, Clone)]
pub struct Guard {
    uid: Uid,
    /// Optional name, used for reuse across transitions
    pub name: Option<String>,
    /// Boolean expression evaluated by the runtime
    pub expression: String,
}

impl Guard {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            uid: Uid::fresh(),
            name: None,
            expression: expression.into(),
        }
    }

    pub fn named(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            uid: Uid::fresh(),
            name: Some(name.into()),
            expression: expression.into(),
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// The name, if one is set and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Named guards compare by name, all others by expression.
impl PartialEq for Guard {
    fn eq(&self, other: &Self) -> bool {
        match (self.name(), other.name()) {
            (Some(a), Some(b)) => a == b,
            _ => self.expression == other.expression,
        }
    }
}
