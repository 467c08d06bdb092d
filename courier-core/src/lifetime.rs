//! Service lifetimes.

use serde::Deserialize;

/// How long a resolved instance lives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// A new instance on every resolve.
    Transient,
    /// One instance per scope (one logical unit of work).
    #[default]
    Scoped,
    /// One instance for the whole container, built against the root scope.
    Singleton,
}
