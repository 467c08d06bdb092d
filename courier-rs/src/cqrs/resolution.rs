//! Handler type resolution: which closed capability type connects a request to its handler.
//!
//! Registration starts from a handler type and dispatch starts from a request value;
//! both end in `handler_service_type`, so they agree on the key by construction.

use std::fmt;
use std::marker::PhantomData;

use courier_core::{ContainerError, Inject, Lifetime, ServiceCollection, ServiceKey, TypeInfo};
use tracing::warn;

use crate::core::{AmbiguityPolicy, RegistrationError};
use crate::cqrs::binding;
use crate::cqrs::handlers::{CommandHandler, EventHandler, QueryHandler, ResultCommandHandler};
use crate::cqrs::requests::{Command, Event, Query, ResultCommand};

struct CommandHandlerShape;
struct ResultCommandHandlerShape;
struct QueryHandlerShape;
struct EventHandlerShape;

/// The four handler capability shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityShape {
    /// `CommandHandler<C>`
    Command,
    /// `ResultCommandHandler<C, R>`
    ResultCommand,
    /// `QueryHandler<Q, R>`
    Query,
    /// `EventHandler<E>`
    Event,
}

impl CapabilityShape {
    pub fn name(self) -> &'static str {
        match self {
            CapabilityShape::Command => "CommandHandler",
            CapabilityShape::ResultCommand => "ResultCommandHandler",
            CapabilityShape::Query => "QueryHandler",
            CapabilityShape::Event => "EventHandler",
        }
    }

    /// Token for the open (unbound) shape.
    pub fn open_type(self) -> TypeInfo {
        match self {
            CapabilityShape::Command => TypeInfo::named::<CommandHandlerShape>(self.name()),
            CapabilityShape::ResultCommand => {
                TypeInfo::named::<ResultCommandHandlerShape>(self.name())
            }
            CapabilityShape::Query => TypeInfo::named::<QueryHandlerShape>(self.name()),
            CapabilityShape::Event => TypeInfo::named::<EventHandlerShape>(self.name()),
        }
    }

    /// Number of type arguments: the request type, plus the result type when there is one.
    pub fn arity(self) -> usize {
        match self {
            CapabilityShape::Command | CapabilityShape::Event => 1,
            CapabilityShape::ResultCommand | CapabilityShape::Query => 2,
        }
    }
}

impl fmt::Display for CapabilityShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Close `shape` over the request's runtime type and, for result-bearing shapes,
/// the result type known at the call site. A result given to a shape without one
/// (or missing for a shape that needs one) is a configuration error.
pub fn handler_service_type(
    shape: CapabilityShape,
    request: TypeInfo,
    result: Option<TypeInfo>,
) -> Result<ServiceKey, ContainerError> {
    match (shape.arity(), result) {
        (1, None) => ServiceKey::closed(shape.open_type(), &[request]),
        (2, Some(result)) => ServiceKey::closed(shape.open_type(), &[request, result]),
        (arity, result) => Err(ContainerError::InvalidServiceKey {
            open: shape.name(),
            reason: format!(
                "{} takes {} type argument(s), got request {} with result {}",
                shape,
                arity,
                request,
                result.map_or("none", |r| r.name())
            ),
        }),
    }
}

type Binder = fn(&mut ServiceCollection, ServiceKey, Lifetime);

enum Declared {
    Handler {
        shape: CapabilityShape,
        args: Vec<TypeInfo>,
        bind: Binder,
    },
    Unrelated,
}

/// One entry of a type's declared capability set.
pub struct Capability<H> {
    interface: TypeInfo,
    declared: Declared,
    _handler: PhantomData<fn() -> H>,
}

impl<H: Inject> Capability<H> {
    pub fn command<C>() -> Self
    where
        C: Command,
        H: CommandHandler<C>,
    {
        Self::handler::<dyn CommandHandler<C>>(
            CapabilityShape::Command,
            vec![TypeInfo::of::<C>()],
            binding::bind_command::<C, H>,
        )
    }

    pub fn result_command<C, R>() -> Self
    where
        C: ResultCommand<R>,
        R: Send + 'static,
        H: ResultCommandHandler<C, R>,
    {
        Self::handler::<dyn ResultCommandHandler<C, R>>(
            CapabilityShape::ResultCommand,
            vec![TypeInfo::of::<C>(), TypeInfo::of::<R>()],
            binding::bind_result_command::<C, R, H>,
        )
    }

    pub fn query<Q, R>() -> Self
    where
        Q: Query<R>,
        R: Send + 'static,
        H: QueryHandler<Q, R>,
    {
        Self::handler::<dyn QueryHandler<Q, R>>(
            CapabilityShape::Query,
            vec![TypeInfo::of::<Q>(), TypeInfo::of::<R>()],
            binding::bind_query::<Q, R, H>,
        )
    }

    pub fn event<E>() -> Self
    where
        E: Event,
        H: EventHandler<E>,
    {
        Self::handler::<dyn EventHandler<E>>(
            CapabilityShape::Event,
            vec![TypeInfo::of::<E>()],
            binding::bind_event::<E, H>,
        )
    }

    /// A capability that is not a handler shape (e.g. another trait the type implements).
    pub fn unrelated<T: ?Sized + 'static>() -> Self {
        Self {
            interface: TypeInfo::of::<T>(),
            declared: Declared::Unrelated,
            _handler: PhantomData,
        }
    }

    fn handler<I: ?Sized + 'static>(
        shape: CapabilityShape,
        args: Vec<TypeInfo>,
        bind: Binder,
    ) -> Self {
        Self {
            interface: TypeInfo::of::<I>(),
            declared: Declared::Handler { shape, args, bind },
            _handler: PhantomData,
        }
    }
}

impl<H> Capability<H> {
    pub fn interface(&self) -> TypeInfo {
        self.interface
    }

    pub fn shape(&self) -> Option<CapabilityShape> {
        match &self.declared {
            Declared::Handler { shape, .. } => Some(*shape),
            Declared::Unrelated => None,
        }
    }

    /// Positional type arguments: 0 is the request type, 1 (if present) the result type.
    pub fn type_args(&self) -> &[TypeInfo] {
        match &self.declared {
            Declared::Handler { args, .. } => args,
            Declared::Unrelated => &[],
        }
    }

    /// The closed capability type this entry binds under.
    pub fn service_type(&self) -> Result<ServiceKey, RegistrationError> {
        match &self.declared {
            Declared::Handler { shape, args, .. } => Ok(handler_service_type(
                *shape,
                args[0],
                args.get(1).copied(),
            )?),
            Declared::Unrelated => Err(RegistrationError::NotAValidHandler {
                handler: self.interface.name(),
                reason: "not a handler capability".into(),
            }),
        }
    }

    pub(crate) fn bind(
        &self,
        services: &mut ServiceCollection,
        key: ServiceKey,
        lifetime: Lifetime,
    ) -> bool {
        match &self.declared {
            Declared::Handler { bind, .. } => {
                bind(services, key, lifetime);
                true
            }
            Declared::Unrelated => false,
        }
    }
}

impl<H> fmt::Debug for Capability<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("interface", &self.interface.name())
            .field("shape", &self.shape())
            .finish()
    }
}

/// Implemented by handler types that can be registered by type alone
/// (`Registrar::register_handler`). List every capability the type has, handler or not.
pub trait DeclaresCapabilities: Inject {
    fn capabilities() -> Vec<Capability<Self>>;
}

/// Select the handler capability of `H` from its declared set.
///
/// No handler-shaped entry: `NotAValidHandler`. More than one: `NotAValidHandler`
/// under `AmbiguityPolicy::Reject`, otherwise the first in declaration order.
pub fn find_request_capability<H: DeclaresCapabilities>(
    policy: AmbiguityPolicy,
) -> Result<Capability<H>, RegistrationError> {
    let handler = std::any::type_name::<H>();
    let mut matching: Vec<Capability<H>> = H::capabilities()
        .into_iter()
        .filter(|c| c.shape().is_some())
        .collect();

    match matching.len() {
        0 => Err(RegistrationError::NotAValidHandler {
            handler,
            reason: "implements none of CommandHandler, ResultCommandHandler, QueryHandler, EventHandler"
                .into(),
        }),
        1 => Ok(matching.remove(0)),
        n => {
            let names: Vec<&str> = matching.iter().map(|c| c.interface().name()).collect();
            match policy {
                AmbiguityPolicy::Reject => Err(RegistrationError::NotAValidHandler {
                    handler,
                    reason: format!(
                        "declares {} handler capabilities ({}); register each one with a typed registrar method",
                        n,
                        names.join(", ")
                    ),
                }),
                AmbiguityPolicy::FirstDeclared => {
                    warn!(handler, capabilities = ?names, "several handler capabilities, binding the first declared");
                    Ok(matching.remove(0))
                }
            }
        }
    }
}
