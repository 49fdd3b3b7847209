//! Collections and cache scopes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A record-store collection together with the namespace its cache keys live in.
///
/// The record-store name and the cache namespace differ for permissions: the
/// records live in `control_system` but are cached under `permission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection {
    name: &'static str,
    cache_namespace: &'static str,
}

impl Collection {
    /// Tasks.
    pub const TASK: Self = Self::new("task", "task");

    /// Permission grants, stored in the `control_system` collection.
    pub const PERMISSION: Self = Self::new("control_system", "permission");

    /// Creates a collection descriptor.
    #[must_use]
    pub const fn new(name: &'static str, cache_namespace: &'static str) -> Self {
        Self {
            name,
            cache_namespace,
        }
    }

    /// Name of the collection in the record store.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Prefix used for this collection's cache keys.
    #[must_use]
    pub const fn cache_namespace(&self) -> &'static str {
        self.cache_namespace
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cache_namespace)
    }
}

/// Partition of a list cache: one email, or every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// The sentinel scope covering all records.
    All,
    /// Records whose `email` field equals the value.
    Email(String),
}

impl Scope {
    /// Literal used for [`Scope::All`] in cache keys.
    pub const ALL: &'static str = "all";

    /// Builds a scope from an optional email; blank emails mean [`Scope::All`].
    #[must_use]
    pub fn from_email(email: Option<&str>) -> Self {
        match email.map(str::trim) {
            Some(email) if !email.is_empty() => Self::Email(email.to_string()),
            _ => Self::All,
        }
    }

    /// Returns the email this scope is restricted to, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Email(email) => Some(email),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL),
            Self::Email(email) => f.write_str(email),
        }
    }
}
