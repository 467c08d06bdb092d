//! CQRS: request kinds, handler capabilities, handler type resolution, registrar.

mod binding;
pub mod handlers;
pub mod registrar;
pub mod requests;
pub mod resolution;

pub(crate) use binding::{HandlerSlot, InvocationError};
pub use handlers::{CommandHandler, EventHandler, QueryHandler, ResultCommandHandler};
pub use registrar::{add_cqrs, Registrar};
pub use requests::{Command, Event, Query, Request, ResultCommand};
pub use resolution::{
    find_request_capability, handler_service_type, Capability, CapabilityShape,
    DeclaresCapabilities,
};
