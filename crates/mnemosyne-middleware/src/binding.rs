//! Route binding configuration.
//!
//! A route declares which strategy to resolve before its handler runs, and
//! under which request attribute the result is exposed. The configuration
//! surface accepts two shapes (a bare strategy name, or a structured object
//! with `strategy` and `assign` fields) and both normalize to
//! [`RouteBinding`] at deserialization time, so the hook never re-inspects
//! raw configuration per request.

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// The attribute name used when a binding does not specify one.
pub const DEFAULT_ATTRIBUTE: &str = "context";

/// Where a resolved context is attached on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assign {
    /// Attach under this attribute name.
    Named(String),
    /// Resolve (and cache) without attaching anything.
    Suppress,
}

impl Assign {
    /// Returns the attribute name to assign to, if any.
    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Suppress => None,
        }
    }
}

impl Default for Assign {
    fn default() -> Self {
        Self::Named(DEFAULT_ATTRIBUTE.to_string())
    }
}

impl<'de> Deserialize<'de> for Assign {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(false) => Ok(Self::Suppress),
            Repr::Flag(true) => Err(de::Error::custom(
                "assign must be an attribute name or false",
            )),
            Repr::Name(name) if name.is_empty() => Ok(Self::Suppress),
            Repr::Name(name) => Ok(Self::Named(name)),
        }
    }
}

/// Normalized per-route context binding.
///
/// Deserializes from either configuration shape:
///
/// ```
/// use mnemosyne_middleware::{Assign, RouteBinding};
///
/// let bare: RouteBinding = serde_json::from_str("\"user\"").unwrap();
/// assert_eq!(bare.strategy(), "user");
/// assert_eq!(bare.assign().attribute(), Some("context"));
///
/// let structured: RouteBinding =
///     serde_json::from_str(r#"{"strategy": "user", "assign": false}"#).unwrap();
/// assert_eq!(structured.assign(), &Assign::Suppress);
/// ```
///
/// A structured form without a strategy name deserializes (the defect is
/// reported per-request by the hook, which short-circuits with an internal
/// error before attempting any resolution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    strategy: String,
    assign: Assign,
}

impl RouteBinding {
    /// Creates a binding with an explicit assignment.
    #[must_use]
    pub fn new(strategy: impl Into<String>, assign: Assign) -> Self {
        Self {
            strategy: strategy.into(),
            assign,
        }
    }

    /// Creates a bare-name binding with the default attribute.
    #[must_use]
    pub fn named(strategy: impl Into<String>) -> Self {
        Self::new(strategy, Assign::default())
    }

    /// Returns the strategy name to resolve.
    #[must_use]
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Returns where the resolved context is attached.
    #[must_use]
    pub fn assign(&self) -> &Assign {
        &self.assign
    }
}

impl<'de> Deserialize<'de> for RouteBinding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Structured {
                #[serde(default)]
                strategy: String,
                #[serde(default)]
                assign: Assign,
            },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bare(strategy) => Ok(Self::named(strategy)),
            Repr::Structured { strategy, assign } => Ok(Self::new(strategy, assign)),
        }
    }
}
