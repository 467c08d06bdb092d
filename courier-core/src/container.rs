//! Service container: register descriptors by key, build once, resolve per scope.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, trace};

use crate::lifetime::Lifetime;
use crate::resolver::{Inject, ServiceResolver};
use crate::service_key::{ServiceKey, TypeInfo};

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("service of type {service} was unable to be resolved")]
    ServiceNotResolved { service: String },
    #[error("cannot close {open}: {reason}")]
    InvalidServiceKey { open: &'static str, reason: String },
    #[error("service registered for {service} is not a {expected}")]
    TypeMismatch {
        service: String,
        expected: &'static str,
    },
    #[error("factory for {service} failed: {source}")]
    Factory {
        service: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A resolved service. Concrete services are stored as `Arc<T>` erased to `Any`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Builds an instance against the scope it is being resolved from.
pub type Factory = Arc<dyn Fn(&Scope) -> Result<Instance, ContainerError> + Send + Sync>;

type Cache = Arc<Mutex<HashMap<(ServiceKey, usize), Instance>>>;

struct Descriptor {
    implementation: TypeInfo,
    lifetime: Lifetime,
    factory: Factory,
}

/// Registrations in the order they were made. Turned into a `Container` by `build()`.
#[derive(Default)]
pub struct ServiceCollection {
    descriptors: Vec<(ServiceKey, Descriptor)>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to an implementation. Registering the same key again adds a second
    /// binding; `resolve` returns the last one, `resolve_all` returns all of them.
    pub fn register(
        &mut self,
        key: ServiceKey,
        implementation: TypeInfo,
        lifetime: Lifetime,
        factory: Factory,
    ) {
        debug!(service = %key, implementation = %implementation, ?lifetime, "service registered");
        self.descriptors.push((
            key,
            Descriptor {
                implementation,
                lifetime,
                factory,
            },
        ));
    }

    /// Register a ready-made instance as a singleton.
    pub fn register_instance<T: Send + Sync + 'static>(&mut self, value: T) {
        let instance: Instance = Arc::new(value);
        self.register(
            ServiceKey::of::<T>(),
            TypeInfo::of::<T>(),
            Lifetime::Singleton,
            Arc::new(move |_: &Scope| -> Result<Instance, ContainerError> {
                Ok(Arc::clone(&instance))
            }),
        );
    }

    pub fn register_factory<T, F>(&mut self, lifetime: Lifetime, f: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> Result<T, ContainerError> + Send + Sync + 'static,
    {
        self.register(
            ServiceKey::of::<T>(),
            TypeInfo::of::<T>(),
            lifetime,
            Arc::new(move |scope: &Scope| -> Result<Instance, ContainerError> {
                Ok(Arc::new(f(scope)?))
            }),
        );
    }

    /// Register `T` built through its `Inject` implementation.
    pub fn register_injectable<T: Inject>(&mut self, lifetime: Lifetime) {
        self.register_factory::<T, _>(lifetime, T::inject);
    }

    /// Move every binding of `other` after the bindings already here, keeping their order.
    pub fn append(&mut self, other: ServiceCollection) {
        self.descriptors.extend(other.descriptors);
    }

    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.descriptors.iter().any(|(k, _)| k == key)
    }

    /// Number of bindings (not distinct keys).
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the registrations. No bindings can be added to the result.
    pub fn build(self) -> Container {
        let mut services: HashMap<ServiceKey, Vec<Descriptor>> = HashMap::new();
        for (key, descriptor) in self.descriptors {
            services.entry(key).or_default().push(descriptor);
        }
        let registry = Arc::new(Registry {
            services,
            root_cache: Cache::default(),
        });
        Container {
            root: Scope::root(&registry),
        }
    }
}

struct Registry {
    services: HashMap<ServiceKey, Vec<Descriptor>>,
    root_cache: Cache,
}

/// Built, immutable container. Resolves through its root scope; use `create_scope`
/// for one unit of work so scoped services are not shared across operations.
pub struct Container {
    root: Scope,
}

impl Container {
    pub fn create_scope(&self) -> Scope {
        Scope {
            registry: Arc::clone(&self.root.registry),
            cache: Cache::default(),
        }
    }

    pub fn root(&self) -> &Scope {
        &self.root
    }
}

impl ServiceResolver for Container {
    fn resolve(&self, service: &ServiceKey) -> Result<Option<Instance>, ContainerError> {
        self.root.resolve(service)
    }

    fn resolve_all(&self, service: &ServiceKey) -> Result<Vec<Instance>, ContainerError> {
        self.root.resolve_all(service)
    }
}

/// One unit of work. Scoped services are built once per scope; clones share the cache.
#[derive(Clone)]
pub struct Scope {
    registry: Arc<Registry>,
    cache: Cache,
}

impl Scope {
    fn root(registry: &Arc<Registry>) -> Self {
        Self {
            registry: Arc::clone(registry),
            cache: Arc::clone(&registry.root_cache),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<(ServiceKey, usize), Instance>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn instantiate(
        &self,
        key: &ServiceKey,
        index: usize,
        descriptor: &Descriptor,
    ) -> Result<Instance, ContainerError> {
        trace!(service = %key, implementation = %descriptor.implementation, "instantiating");
        match descriptor.lifetime {
            Lifetime::Transient => (descriptor.factory)(self),
            Lifetime::Scoped => self.cached(key, index, descriptor),
            Lifetime::Singleton => Scope::root(&self.registry).cached(key, index, descriptor),
        }
    }

    fn cached(
        &self,
        key: &ServiceKey,
        index: usize,
        descriptor: &Descriptor,
    ) -> Result<Instance, ContainerError> {
        let slot = (*key, index);
        if let Some(instance) = self.lock_cache().get(&slot) {
            return Ok(Arc::clone(instance));
        }
        // Built without the lock held: the factory may resolve other services from this scope.
        let created = (descriptor.factory)(self)?;
        Ok(Arc::clone(self.lock_cache().entry(slot).or_insert(created)))
    }
}

impl ServiceResolver for Scope {
    fn resolve(&self, service: &ServiceKey) -> Result<Option<Instance>, ContainerError> {
        let Some(descriptors) = self.registry.services.get(service) else {
            trace!(service = %service, "no registration");
            return Ok(None);
        };
        match descriptors.len().checked_sub(1) {
            Some(last) => self
                .instantiate(service, last, &descriptors[last])
                .map(Some),
            None => Ok(None),
        }
    }

    fn resolve_all(&self, service: &ServiceKey) -> Result<Vec<Instance>, ContainerError> {
        let Some(descriptors) = self.registry.services.get(service) else {
            return Ok(Vec::new());
        };
        descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| self.instantiate(service, index, descriptor))
            .collect()
    }
}
