//! Resolver contract consumed by dispatchers, plus typed helpers and constructor injection.

use std::sync::Arc;

use crate::container::{ContainerError, Instance, Scope};
use crate::service_key::ServiceKey;

/// Turns a service key into an instance. `Container` and `Scope` implement it;
/// `FnResolver` adapts any other resolver expressed as closures.
pub trait ServiceResolver: Send + Sync {
    /// The last registration for `service`, or `None` when nothing is registered.
    fn resolve(&self, service: &ServiceKey) -> Result<Option<Instance>, ContainerError>;

    /// Every registration for `service`, in registration order. Empty is not an error.
    fn resolve_all(&self, service: &ServiceKey) -> Result<Vec<Instance>, ContainerError> {
        Ok(self.resolve(service)?.into_iter().collect())
    }

    /// Like `resolve`, but a missing registration is `ServiceNotResolved`.
    fn resolve_required(&self, service: &ServiceKey) -> Result<Instance, ContainerError> {
        self.resolve(service)?
            .ok_or_else(|| ContainerError::ServiceNotResolved {
                service: service.to_string(),
            })
    }
}

type ResolveFn = Box<dyn Fn(&ServiceKey) -> Option<Instance> + Send + Sync>;
type ResolveAllFn = Box<dyn Fn(&ServiceKey) -> Vec<Instance> + Send + Sync>;

/// Resolver backed by plain functions, for hosts that bring their own container.
pub struct FnResolver {
    resolve: ResolveFn,
    resolve_all: Option<ResolveAllFn>,
}

impl FnResolver {
    pub fn new(resolve: impl Fn(&ServiceKey) -> Option<Instance> + Send + Sync + 'static) -> Self {
        Self {
            resolve: Box::new(resolve),
            resolve_all: None,
        }
    }

    /// Supply multi-resolution; without it `resolve_all` yields at most one instance.
    pub fn with_all(
        mut self,
        resolve_all: impl Fn(&ServiceKey) -> Vec<Instance> + Send + Sync + 'static,
    ) -> Self {
        self.resolve_all = Some(Box::new(resolve_all));
        self
    }
}

impl ServiceResolver for FnResolver {
    fn resolve(&self, service: &ServiceKey) -> Result<Option<Instance>, ContainerError> {
        Ok((self.resolve)(service))
    }

    fn resolve_all(&self, service: &ServiceKey) -> Result<Vec<Instance>, ContainerError> {
        match &self.resolve_all {
            Some(all) => Ok(all(service)),
            None => Ok((self.resolve)(service).into_iter().collect()),
        }
    }
}

/// Typed access for services registered under `ServiceKey::of::<T>()`.
pub trait ResolveExt: ServiceResolver {
    fn get<T: Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, ContainerError> {
        let key = ServiceKey::of::<T>();
        match self.resolve(&key)? {
            Some(instance) => downcast(&key, instance).map(Some),
            None => Ok(None),
        }
    }

    fn get_required<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        let key = ServiceKey::of::<T>();
        downcast(&key, self.resolve_required(&key)?)
    }
}

impl<R: ServiceResolver + ?Sized> ResolveExt for R {}

fn downcast<T: Send + Sync + 'static>(
    key: &ServiceKey,
    instance: Instance,
) -> Result<Arc<T>, ContainerError> {
    instance
        .downcast::<T>()
        .map_err(|_| ContainerError::TypeMismatch {
            service: key.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

/// Constructor injection: build `Self` from services available in `scope`.
/// `#[derive(Inject)]` in courier-rs resolves every `Arc<T>` field this way.
pub trait Inject: Sized + Send + Sync + 'static {
    fn inject(scope: &Scope) -> Result<Self, ContainerError>;
}
