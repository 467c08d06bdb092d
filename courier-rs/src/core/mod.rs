//! Core: errors, options, and the resolver adapter used by dispatchers.

pub mod error;
pub mod options;
pub mod service_factory;

pub use error::{DispatchError, HandlerError, HandlerFailures, RegistrationError};
pub use options::{AmbiguityPolicy, CqrsOptions, FailurePolicy};
pub use service_factory::ServiceFactory;
