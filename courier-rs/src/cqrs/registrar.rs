//! Registrar: bind handler types into a `ServiceCollection` under their closed capability type.

use courier_core::{Inject, Lifetime, ServiceCollection, TypeInfo};
use tracing::debug;

use crate::core::{CqrsOptions, RegistrationError};
use crate::cqrs::binding;
use crate::cqrs::handlers::{CommandHandler, EventHandler, QueryHandler, ResultCommandHandler};
use crate::cqrs::requests::{Command, Event, Query, ResultCommand};
use crate::cqrs::resolution::{
    find_request_capability, handler_service_type, CapabilityShape, DeclaresCapabilities,
};

/// Adds handlers to a `ServiceCollection`. `lifetime: None` uses
/// `CqrsOptions::default_lifetime` (scoped unless configured otherwise).
///
/// ```ignore
/// let mut services = ServiceCollection::new();
/// Registrar::new(&mut services, CqrsOptions::default())
///     .add_command_handler::<CreateOrder, CreateOrderHandler>(None)?
///     .add_query_handler::<GetOrder, Order, GetOrderHandler>(Some(Lifetime::Transient))?;
/// ```
pub struct Registrar<'a> {
    services: &'a mut ServiceCollection,
    options: CqrsOptions,
}

impl<'a> Registrar<'a> {
    pub fn new(services: &'a mut ServiceCollection, options: CqrsOptions) -> Self {
        Self { services, options }
    }

    pub fn options(&self) -> &CqrsOptions {
        &self.options
    }

    /// The collection being registered into, for non-handler services.
    pub fn services(&mut self) -> &mut ServiceCollection {
        &mut *self.services
    }

    fn lifetime(&self, lifetime: Option<Lifetime>) -> Lifetime {
        lifetime.unwrap_or(self.options.default_lifetime)
    }

    pub fn add_command_handler<C, H>(
        &mut self,
        lifetime: Option<Lifetime>,
    ) -> Result<&mut Self, RegistrationError>
    where
        C: Command,
        H: CommandHandler<C> + Inject,
    {
        let key = handler_service_type(CapabilityShape::Command, TypeInfo::of::<C>(), None)?;
        let lifetime = self.lifetime(lifetime);
        debug!(service = %key, handler = std::any::type_name::<H>(), ?lifetime, "command handler added");
        binding::bind_command::<C, H>(self.services, key, lifetime);
        Ok(self)
    }

    pub fn add_result_command_handler<C, R, H>(
        &mut self,
        lifetime: Option<Lifetime>,
    ) -> Result<&mut Self, RegistrationError>
    where
        C: ResultCommand<R>,
        R: Send + 'static,
        H: ResultCommandHandler<C, R> + Inject,
    {
        let key = handler_service_type(
            CapabilityShape::ResultCommand,
            TypeInfo::of::<C>(),
            Some(TypeInfo::of::<R>()),
        )?;
        let lifetime = self.lifetime(lifetime);
        debug!(service = %key, handler = std::any::type_name::<H>(), ?lifetime, "command handler added");
        binding::bind_result_command::<C, R, H>(self.services, key, lifetime);
        Ok(self)
    }

    pub fn add_query_handler<Q, R, H>(
        &mut self,
        lifetime: Option<Lifetime>,
    ) -> Result<&mut Self, RegistrationError>
    where
        Q: Query<R>,
        R: Send + 'static,
        H: QueryHandler<Q, R> + Inject,
    {
        let key = handler_service_type(
            CapabilityShape::Query,
            TypeInfo::of::<Q>(),
            Some(TypeInfo::of::<R>()),
        )?;
        let lifetime = self.lifetime(lifetime);
        debug!(service = %key, handler = std::any::type_name::<H>(), ?lifetime, "query handler added");
        binding::bind_query::<Q, R, H>(self.services, key, lifetime);
        Ok(self)
    }

    /// Events fan out: every handler added for `E` is invoked.
    pub fn add_event_handler<E, H>(
        &mut self,
        lifetime: Option<Lifetime>,
    ) -> Result<&mut Self, RegistrationError>
    where
        E: Event,
        H: EventHandler<E> + Inject,
    {
        let key = handler_service_type(CapabilityShape::Event, TypeInfo::of::<E>(), None)?;
        let lifetime = self.lifetime(lifetime);
        debug!(service = %key, handler = std::any::type_name::<H>(), ?lifetime, "event handler added");
        binding::bind_event::<E, H>(self.services, key, lifetime);
        Ok(self)
    }

    /// Register `H` by its declared capability set alone. Fails with `NotAValidHandler`
    /// (and registers nothing) when `H` declares no handler capability, or declares
    /// several under `AmbiguityPolicy::Reject`.
    pub fn register_handler<H: DeclaresCapabilities>(
        &mut self,
        lifetime: Option<Lifetime>,
    ) -> Result<&mut Self, RegistrationError> {
        let capability = find_request_capability::<H>(self.options.ambiguous_handlers)?;
        let key = capability.service_type()?;
        let lifetime = self.lifetime(lifetime);
        debug!(
            service = %key,
            handler = std::any::type_name::<H>(),
            ?lifetime,
            "handler registered by declared capability"
        );
        if !capability.bind(self.services, key, lifetime) {
            return Err(RegistrationError::NotAValidHandler {
                handler: std::any::type_name::<H>(),
                reason: format!("{} is not a handler capability", capability.interface()),
            });
        }
        Ok(self)
    }
}

/// Configure handlers on `services` in one block. Registrations are staged and only
/// added to `services` when `configure` succeeds; on error `services` is left as it was.
///
/// ```ignore
/// add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
///     cqrs.add_command_handler::<CreateOrder, CreateOrderHandler>(None)?;
///     Ok(())
/// })?;
/// ```
pub fn add_cqrs<F>(
    services: &mut ServiceCollection,
    options: CqrsOptions,
    configure: F,
) -> Result<(), RegistrationError>
where
    F: FnOnce(&mut Registrar<'_>) -> Result<(), RegistrationError>,
{
    let mut staged = ServiceCollection::new();
    configure(&mut Registrar::new(&mut staged, options))?;
    services.append(staged);
    Ok(())
}
