//! Command dispatch: typed, result-bearing and erased paths to a single handler.

use std::sync::Arc;

use courier_core::TypeInfo;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::invoke_slot;
use crate::core::{DispatchError, ServiceFactory};
use crate::cqrs::{
    handler_service_type, CapabilityShape, Command, CommandHandler, Request, ResultCommand,
};

/// Routes commands to their single registered handler.
#[derive(Clone)]
pub struct CommandDispatcher {
    services: ServiceFactory,
}

impl CommandDispatcher {
    pub fn new(services: ServiceFactory) -> Self {
        Self { services }
    }

    /// Dispatch a command that produces no result.
    pub async fn dispatch<C: Command>(
        &self,
        command: C,
        cancel: CancellationToken,
    ) -> Result<(), DispatchError> {
        let service = handler_service_type(CapabilityShape::Command, TypeInfo::of::<C>(), None)?;
        debug!(%service, "dispatching command");
        let handler: Arc<dyn CommandHandler<C>> = self.services.get_required_as(&service)?;
        handler
            .handle(command, cancel)
            .await
            .map_err(DispatchError::Handler)
    }

    /// Dispatch a command whose concrete type is known here.
    pub async fn dispatch_with_result<C, R>(
        &self,
        command: C,
        cancel: CancellationToken,
    ) -> Result<R, DispatchError>
    where
        C: ResultCommand<R>,
        R: Send + 'static,
    {
        let request_type = TypeInfo::of::<C>();
        let service = handler_service_type(
            CapabilityShape::ResultCommand,
            request_type,
            Some(TypeInfo::of::<R>()),
        )?;
        debug!(%service, "dispatching command");
        invoke_slot(&self.services, service, request_type, Box::new(command), cancel).await
    }

    /// Dispatch a command held only as `dyn ResultCommand<R>`. The handler is found from
    /// the command's runtime type plus `R`, so a handler producing another type never matches.
    pub async fn dispatch_erased<R: Send + 'static>(
        &self,
        command: Box<dyn ResultCommand<R>>,
        cancel: CancellationToken,
    ) -> Result<R, DispatchError> {
        let request_type = Request::type_info(&*command);
        let service = handler_service_type(
            CapabilityShape::ResultCommand,
            request_type,
            Some(TypeInfo::of::<R>()),
        )?;
        debug!(%service, "dispatching erased command");
        invoke_slot(
            &self.services,
            service,
            request_type,
            Request::into_any(command),
            cancel,
        )
        .await
    }
}
