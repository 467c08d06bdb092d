//! Registrar and dispatcher options. Deserializable so hosts can keep them in config files.

use courier_core::Lifetime;
use serde::Deserialize;

/// How an event dispatch reports handler failures once every handler has finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report the first failure in registration order as `DispatchError::Handler`.
    #[default]
    FirstError,
    /// Report every failure as `DispatchError::Aggregate`.
    AllErrors,
}

/// What `register_handler` does when a type declares more than one handler capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Refuse the registration with `NotAValidHandler`.
    #[default]
    Reject,
    /// Bind the first capability in declaration order and log a warning.
    FirstDeclared,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CqrsOptions {
    /// Lifetime for handlers registered without an explicit one.
    pub default_lifetime: Lifetime,
    pub event_failure_policy: FailurePolicy,
    pub ambiguous_handlers: AmbiguityPolicy,
}

impl CqrsOptions {
    /// Parse options from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
