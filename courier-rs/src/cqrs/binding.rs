//! Statically typed invocation thunks, captured when a handler is registered.
//!
//! Void commands and events are stored as `Arc<dyn CommandHandler<C>>` /
//! `Arc<dyn EventHandler<E>>`: callers always name `C` or `E`. Result-bearing
//! commands and queries may be dispatched through `Box<dyn ResultCommand<R>>`,
//! where only `R` is nameable, so they are stored as `HandlerSlot<R>` whose thunk
//! already knows how to turn the erased request back into its concrete type.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{
    ContainerError, Inject, Instance, Lifetime, Scope, ServiceCollection, ServiceKey, TypeInfo,
};
use tokio_util::sync::CancellationToken;

use crate::core::HandlerError;
use crate::cqrs::handlers::{CommandHandler, EventHandler, QueryHandler, ResultCommandHandler};
use crate::cqrs::requests::{Command, Event, Query, ResultCommand};

/// Failure of an erased invocation, before the dispatcher unwraps it.
pub(crate) enum InvocationError {
    /// The handler ran and failed; carried through untouched.
    Handler(HandlerError),
    /// The erased request was not the type the thunk was bound for.
    Mismatch,
}

#[async_trait]
pub(crate) trait ErasedHandler<R>: Send + Sync {
    async fn handle_erased(
        &self,
        request: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<R, InvocationError>;
}

pub(crate) type HandlerSlot<R> = Arc<dyn ErasedHandler<R>>;

struct ResultCommandThunk<C, R, H> {
    handler: H,
    _request: PhantomData<fn(C) -> R>,
}

#[async_trait]
impl<C, R, H> ErasedHandler<R> for ResultCommandThunk<C, R, H>
where
    C: ResultCommand<R>,
    R: Send + 'static,
    H: ResultCommandHandler<C, R>,
{
    async fn handle_erased(
        &self,
        request: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<R, InvocationError> {
        let command = request
            .downcast::<C>()
            .map_err(|_| InvocationError::Mismatch)?;
        self.handler
            .handle(*command, cancel)
            .await
            .map_err(InvocationError::Handler)
    }
}

struct QueryThunk<Q, R, H> {
    handler: H,
    _request: PhantomData<fn(Q) -> R>,
}

#[async_trait]
impl<Q, R, H> ErasedHandler<R> for QueryThunk<Q, R, H>
where
    Q: Query<R>,
    R: Send + 'static,
    H: QueryHandler<Q, R>,
{
    async fn handle_erased(
        &self,
        request: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<R, InvocationError> {
        let query = request
            .downcast::<Q>()
            .map_err(|_| InvocationError::Mismatch)?;
        self.handler
            .handle(*query, cancel)
            .await
            .map_err(InvocationError::Handler)
    }
}

fn register_slot<H, S, F>(
    services: &mut ServiceCollection,
    key: ServiceKey,
    lifetime: Lifetime,
    wrap: F,
) where
    H: Inject,
    S: Send + Sync + 'static,
    F: Fn(H) -> S + Send + Sync + 'static,
{
    services.register(
        key,
        TypeInfo::of::<H>(),
        lifetime,
        Arc::new(move |scope: &Scope| -> Result<Instance, ContainerError> {
            Ok(Arc::new(wrap(H::inject(scope)?)))
        }),
    );
}

pub(crate) fn bind_command<C, H>(
    services: &mut ServiceCollection,
    key: ServiceKey,
    lifetime: Lifetime,
) where
    C: Command,
    H: CommandHandler<C> + Inject,
{
    register_slot::<H, _, _>(services, key, lifetime, |handler| {
        Arc::new(handler) as Arc<dyn CommandHandler<C>>
    });
}

pub(crate) fn bind_result_command<C, R, H>(
    services: &mut ServiceCollection,
    key: ServiceKey,
    lifetime: Lifetime,
) where
    C: ResultCommand<R>,
    R: Send + 'static,
    H: ResultCommandHandler<C, R> + Inject,
{
    register_slot::<H, _, _>(services, key, lifetime, |handler| {
        Arc::new(ResultCommandThunk {
            handler,
            _request: PhantomData::<fn(C) -> R>,
        }) as HandlerSlot<R>
    });
}

pub(crate) fn bind_query<Q, R, H>(
    services: &mut ServiceCollection,
    key: ServiceKey,
    lifetime: Lifetime,
) where
    Q: Query<R>,
    R: Send + 'static,
    H: QueryHandler<Q, R> + Inject,
{
    register_slot::<H, _, _>(services, key, lifetime, |handler| {
        Arc::new(QueryThunk {
            handler,
            _request: PhantomData::<fn(Q) -> R>,
        }) as HandlerSlot<R>
    });
}

pub(crate) fn bind_event<E, H>(
    services: &mut ServiceCollection,
    key: ServiceKey,
    lifetime: Lifetime,
) where
    E: Event,
    H: EventHandler<E> + Inject,
{
    register_slot::<H, _, _>(services, key, lifetime, |handler| {
        Arc::new(handler) as Arc<dyn EventHandler<E>>
    });
}
