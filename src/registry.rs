//! Record types exposed for generic CRUD management.

use std::fmt;

use thiserror::Error;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Token,
    Option,
    Country,
    City,
    Tag,
    Domain,
    Subscriber,
    Activity,
    SubscriptionFormTemplate,
}

impl RecordKind {
    pub const ALL: [RecordKind; 9] = [
        Self::Token,
        Self::Option,
        Self::Country,
        Self::City,
        Self::Tag,
        Self::Domain,
        Self::Subscriber,
        Self::Activity,
        Self::SubscriptionFormTemplate,
    ];

    pub fn app_label(self) -> &'static str {
        match self {
            Self::Token | Self::Option | Self::Country | Self::City => "core",
            _ => "subscribers",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Option => "option",
            Self::Country => "country",
            Self::City => "city",
            Self::Tag => "tag",
            Self::Domain => "domain",
            Self::Subscriber => "subscriber",
            Self::Activity => "activity",
            Self::SubscriptionFormTemplate => "subscriptionformtemplate",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label(), self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} is already registered")]
    AlreadyRegistered(RecordKind),
}

#[derive(Debug, Clone, Default)]
pub struct RecordRegistry {
    kinds: Vec<RecordKind>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record kind, in declaration order.
    pub fn with_defaults() -> Self {
        Self {
            kinds: RecordKind::ALL.to_vec(),
        }
    }

    pub fn register(&mut self, kind: RecordKind) -> Result<(), RegistryError> {
        if self.is_registered(kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        self.kinds.push(kind);
        Ok(())
    }

    pub fn is_registered(&self, kind: RecordKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn kinds(&self) -> &[RecordKind] {
        &self.kinds
    }
}
