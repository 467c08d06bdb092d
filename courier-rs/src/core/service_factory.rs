//! ServiceFactory: the resolver as seen by dispatchers.

use std::any::Any;
use std::sync::Arc;

use courier_core::{Container, FnResolver, Instance, Scope, ServiceKey, ServiceResolver};

use super::error::DispatchError;

/// Wraps any `ServiceResolver` as the single resolve function dispatchers call.
/// `get_required` turns a miss into `DispatchError::ServiceNotResolved`.
#[derive(Clone)]
pub struct ServiceFactory {
    resolver: Arc<dyn ServiceResolver>,
}

impl ServiceFactory {
    pub fn new(resolver: impl ServiceResolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    pub fn from_arc(resolver: Arc<dyn ServiceResolver>) -> Self {
        Self { resolver }
    }

    /// Resolve through a plain function, for hosts with their own container.
    pub fn from_fn(
        resolve: impl Fn(&ServiceKey) -> Option<Instance> + Send + Sync + 'static,
    ) -> Self {
        Self::new(FnResolver::new(resolve))
    }

    pub fn get(&self, service: &ServiceKey) -> Result<Option<Instance>, DispatchError> {
        Ok(self.resolver.resolve(service)?)
    }

    pub fn get_required(&self, service: &ServiceKey) -> Result<Instance, DispatchError> {
        Ok(self.resolver.resolve_required(service)?)
    }

    pub fn get_all(&self, service: &ServiceKey) -> Result<Vec<Instance>, DispatchError> {
        Ok(self.resolver.resolve_all(service)?)
    }

    /// Resolve `service` and take the `T` stored in it (handler slots are stored as
    /// `Arc<dyn ...>` values, so `T` is usually such an `Arc`).
    pub(crate) fn get_required_as<T>(&self, service: &ServiceKey) -> Result<T, DispatchError>
    where
        T: Any + Clone,
    {
        let instance = self.get_required(service)?;
        slot::<T>(service, &instance)
    }

    pub(crate) fn get_all_as<T>(&self, service: &ServiceKey) -> Result<Vec<T>, DispatchError>
    where
        T: Any + Clone,
    {
        self.get_all(service)?
            .iter()
            .map(|instance| slot::<T>(service, instance))
            .collect()
    }
}

fn slot<T: Any + Clone>(service: &ServiceKey, instance: &Instance) -> Result<T, DispatchError> {
    instance
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| {
            DispatchError::Container(courier_core::ContainerError::TypeMismatch {
                service: service.to_string(),
                expected: std::any::type_name::<T>(),
            })
        })
}

impl From<Scope> for ServiceFactory {
    fn from(scope: Scope) -> Self {
        Self::new(scope)
    }
}

impl From<Container> for ServiceFactory {
    fn from(container: Container) -> Self {
        Self::new(container)
    }
}

impl From<Arc<dyn ServiceResolver>> for ServiceFactory {
    fn from(resolver: Arc<dyn ServiceResolver>) -> Self {
        Self::from_arc(resolver)
    }
}
