//! Courier core: type tokens, closed service keys, lifetimes and a scoped service container.

pub mod container;
pub mod lifetime;
pub mod resolver;
pub mod service_key;

pub use container::{Container, ContainerError, Factory, Instance, Scope, ServiceCollection};
pub use lifetime::Lifetime;
pub use resolver::{FnResolver, Inject, ResolveExt, ServiceResolver};
pub use service_key::{ServiceKey, TypeInfo, MAX_TYPE_ARGS};
