//! Dispatchers: resolve the handler(s) for a request and invoke them.

mod command;
mod event;
mod query;

pub use command::CommandDispatcher;
pub use event::EventDispatcher;
pub use query::QueryDispatcher;

use courier_core::{Scope, ServiceKey, TypeInfo};
use tokio_util::sync::CancellationToken;

use crate::core::{CqrsOptions, DispatchError, ServiceFactory};
use crate::cqrs::{HandlerSlot, InvocationError};

/// The three dispatchers over one resolver.
#[derive(Clone)]
pub struct Dispatchers {
    pub commands: CommandDispatcher,
    pub queries: QueryDispatcher,
    pub events: EventDispatcher,
}

impl Dispatchers {
    pub fn new(services: ServiceFactory, options: &CqrsOptions) -> Self {
        Self {
            commands: CommandDispatcher::new(services.clone()),
            queries: QueryDispatcher::new(services.clone()),
            events: EventDispatcher::new(services, options.event_failure_policy),
        }
    }

    /// Dispatchers for one unit of work: scoped handlers are shared within `scope` only.
    pub fn for_scope(scope: &Scope, options: &CqrsOptions) -> Self {
        Self::new(ServiceFactory::from(scope.clone()), options)
    }
}

/// Resolve the slot bound under `service` and run its thunk. Handler errors come back
/// as `DispatchError::Handler` with nothing wrapped around them.
async fn invoke_slot<R: Send + 'static>(
    services: &ServiceFactory,
    service: ServiceKey,
    request_type: TypeInfo,
    request: Box<dyn std::any::Any + Send>,
    cancel: CancellationToken,
) -> Result<R, DispatchError> {
    let handler: HandlerSlot<R> = services.get_required_as(&service)?;
    handler
        .handle_erased(request, cancel)
        .await
        .map_err(|e| match e {
            InvocationError::Handler(e) => DispatchError::Handler(e),
            InvocationError::Mismatch => DispatchError::RequestMismatch {
                service: service.to_string(),
                actual: request_type.name(),
            },
        })
}
