//! External identities.
//!
//! Front ends know users and groups by their platform ids. The identity
//! collaborator maps them to the stable internal [`UserId`](crate::UserId) and
//! [`GroupId`](crate::GroupId) that the meeting engine works with.

use serde::{Deserialize, Serialize};

/// Platform an external id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Custom,
    Telegram,
}

impl Source {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Custom => 0,
            Self::Telegram => 1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Custom),
            1 => Some(Self::Telegram),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUser {
    pub id: String,
    pub source: Source,
    #[serde(default)]
    pub display_name: String,
}

impl ExternalUser {
    pub fn new(id: impl Into<String>, source: Source, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source,
            display_name: display_name.into(),
        }
    }

    /// Same platform identity, regardless of display name.
    pub fn same_identity(&self, other: &ExternalUser) -> bool {
        self.id == other.id && self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalGroup {
    pub id: String,
    pub source: Source,
}

impl ExternalGroup {
    pub fn new(id: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_round_trips_through_integer() {
        for source in [Source::Custom, Source::Telegram] {
            assert_eq!(Source::from_i64(source.as_i64()), Some(source));
        }
        assert_eq!(Source::from_i64(7), None);
    }

    #[test]
    fn display_name_does_not_affect_identity() {
        let a = ExternalUser::new("99", Source::Telegram, "alice");
        let b = ExternalUser::new("99", Source::Telegram, "Alice B.");
        let c = ExternalUser::new("99", Source::Custom, "alice");
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }
}
