//! Registration and dispatch errors.

use std::fmt;

use courier_core::ContainerError;
use thiserror::Error;

/// Error raised by a handler body. Boxed so callers can downcast to the handler's own error type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Raised while binding handlers. Always a configuration error; never retried.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("{handler} is not a valid handler: {reason}")]
    NotAValidHandler {
        handler: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Raised by a dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler (or dependency) registered. A missing registration, not a transient failure.
    #[error("service of type {service} was unable to be resolved")]
    ServiceNotResolved { service: String },
    /// The handler's own error, exactly as it raised it.
    #[error(transparent)]
    Handler(HandlerError),
    /// Several event handlers failed and the dispatcher reports all of them.
    #[error(transparent)]
    Aggregate(HandlerFailures),
    #[error("handler bound to {service} cannot accept a {actual}")]
    RequestMismatch {
        service: String,
        actual: &'static str,
    },
    #[error(transparent)]
    Container(ContainerError),
}

impl DispatchError {
    /// The handler error when exactly one is carried.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DispatchError::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<ContainerError> for DispatchError {
    fn from(e: ContainerError) -> Self {
        match e {
            ContainerError::ServiceNotResolved { service } => {
                DispatchError::ServiceNotResolved { service }
            }
            other => DispatchError::Container(other),
        }
    }
}

/// Every failure from one event fan-out, in handler registration order.
#[derive(Debug)]
pub struct HandlerFailures(pub Vec<HandlerError>);

impl HandlerFailures {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandlerError> {
        self.0.iter()
    }
}

impl fmt::Display for HandlerFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} event handler(s) failed", self.0.len())?;
        for (i, e) in self.0.iter().enumerate() {
            write!(f, "{} {}", if i == 0 { ":" } else { ";" }, e)?;
        }
        Ok(())
    }
}

impl std::error::Error for HandlerFailures {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.first().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
