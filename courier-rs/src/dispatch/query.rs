//! Query dispatch.

use courier_core::TypeInfo;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::invoke_slot;
use crate::core::{DispatchError, ServiceFactory};
use crate::cqrs::{handler_service_type, CapabilityShape, Query, Request};

/// Routes queries to their single registered handler. Queries always produce a result.
#[derive(Clone)]
pub struct QueryDispatcher {
    services: ServiceFactory,
}

impl QueryDispatcher {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }

    pub async fn dispatch<Q, R>(&self, query: Q, cancel: CancellationToken) -> Result<R, DispatchError>
    where
        Q: Query<R>,
        R: Send + 'static,
    {
        let request_type = TypeInfo::of::<Q>();
        let service =
            handler_service_type(CapabilityShape::Query, request_type, Some(TypeInfo::of::<R>()))?;
        debug!(%service, "dispatching query");
        invoke_slot(&self.services, service, request_type, Box::new(query), cancel).await
    }

    /// Dispatch a query held only as `dyn Query<R>`.
    pub async fn dispatch_erased<R: Send + 'static>(
        &self,
        query: Box<dyn Query<R>>,
        cancel: CancellationToken,
    ) -> Result<R, DispatchError> {
        let request_type = Request::type_info(&*query);
        let service =
            handler_service_type(CapabilityShape::Query, request_type, Some(TypeInfo::of::<R>()))?;
        debug!(%service, "dispatching erased query");
        invoke_slot(
            &self.services,
            service,
            request_type,
            Request::into_any(query),
            cancel,
        )
        .await
    }
}
