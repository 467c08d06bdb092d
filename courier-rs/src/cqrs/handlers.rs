//! Handler capabilities. Implement one per handler type and register it with the `Registrar`.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::HandlerError;
use crate::cqrs::requests::{Command, Event, Query, ResultCommand};

/// Handles command `C`, producing nothing.
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, command: C, cancel: CancellationToken) -> Result<(), HandlerError>;
}

/// Handles command `C`, producing `R`.
#[async_trait]
pub trait ResultCommandHandler<C, R>: Send + Sync
where
    C: ResultCommand<R>,
    R: Send + 'static,
{
    async fn handle(&self, command: C, cancel: CancellationToken) -> Result<R, HandlerError>;
}

/// Handles query `Q`, producing `R`.
#[async_trait]
pub trait QueryHandler<Q, R>: Send + Sync
where
    Q: Query<R>,
    R: Send + 'static,
{
    async fn handle(&self, query: Q, cancel: CancellationToken) -> Result<R, HandlerError>;
}

/// Observes event `E`. The event is borrowed because every registered handler sees the same value.
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Event,
{
    async fn handle(&self, event: &E, cancel: CancellationToken) -> Result<(), HandlerError>;
}
