//! Event fan-out to every registered handler.

use std::sync::Arc;

use courier_core::TypeInfo;
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::{DispatchError, FailurePolicy, HandlerError, HandlerFailures, ServiceFactory};
use crate::cqrs::{handler_service_type, CapabilityShape, Event, EventHandler};

/// Publishes events to every registered handler concurrently.
#[derive(Clone)]
pub struct EventDispatcher {
    services: ServiceFactory,
    policy: FailurePolicy,
}

impl EventDispatcher {
    pub fn new(services: ServiceFactory, policy: FailurePolicy) -> Self {
        Self { services, policy }
    }

    /// Invoke all handlers of `E` and wait for every one of them. No handlers is a no-op.
    /// Failures are reported per `FailurePolicy` only after all handlers have finished.
    pub async fn dispatch<E: Event>(
        &self,
        event: E,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        let service = handler_service_type(CapabilityShape::Event, TypeInfo::of::<E>(), None)?;
        let handlers: Vec<Arc<dyn EventHandler<E>>> = self.services.get_all_as(&service)?;
        debug!(%service, handlers = handlers.len(), "publishing event");

        let outcomes = join_all(
            handlers
                .iter()
                .map(|handler| handler.handle(&event, cancel.clone())),
        )
        .await;

        let mut failures: Vec<HandlerError> =
            outcomes.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            return Ok(());
        }
        warn!(%service, failed = failures.len(), "event handlers failed");
        match self.policy {
            FailurePolicy::FirstError => Err(DispatchError::Handler(failures.remove(0))),
            FailurePolicy::AllErrors => Err(DispatchError::Aggregate(HandlerFailures(failures))),
        }
    }
}
