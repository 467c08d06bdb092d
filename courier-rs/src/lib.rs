//! Courier for Rust: type-driven command, query and event dispatch on courier-core.
//!
//! Handlers are registered into a `ServiceCollection` under the closed capability type
//! they implement (`CommandHandler<C>`, `ResultCommandHandler<C, R>`, `QueryHandler<Q, R>`,
//! `EventHandler<E>`). Dispatchers compute the same key from the request they are given
//! and resolve the handler through a `ServiceFactory`.
//!
//! ```ignore
//! let mut services = ServiceCollection::new();
//! add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
//!     cqrs.add_result_command_handler::<CreateOrder, OrderId, CreateOrderHandler>(None)?;
//!     Ok(())
//! })?;
//! let container = services.build();
//! let scope = container.create_scope();
//! let dispatchers = Dispatchers::for_scope(&scope, &CqrsOptions::default());
//! let id = dispatchers.commands.dispatch_with_result(CreateOrder { .. }, CancellationToken::new()).await?;
//! ```

extern crate self as courier_rs;

pub mod core;
pub mod cqrs;
pub mod dispatch;

pub use courier_core::{
    Container, ContainerError, FnResolver, Inject, Instance, Lifetime, ResolveExt, Scope,
    ServiceCollection, ServiceKey, ServiceResolver, TypeInfo,
};
pub use async_trait::async_trait;
pub use courier_rs_macros::{Command, Event, Inject, Query};
pub use tokio_util::sync::CancellationToken;

pub use crate::core::{
    AmbiguityPolicy, CqrsOptions, DispatchError, FailurePolicy, HandlerError, HandlerFailures,
    RegistrationError, ServiceFactory,
};
pub use cqrs::{
    add_cqrs, find_request_capability, handler_service_type, Capability, CapabilityShape,
    Command, CommandHandler, DeclaresCapabilities, Event, EventHandler, Query, QueryHandler,
    Registrar, Request, ResultCommand, ResultCommandHandler,
};
pub use dispatch::{CommandDispatcher, Dispatchers, EventDispatcher, QueryDispatcher};
