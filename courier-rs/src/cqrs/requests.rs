//! Request kinds: commands, result-bearing commands, queries and events.

use std::any::Any;

use courier_core::TypeInfo;

/// Anything that can travel through a dispatcher. Implemented for every
/// `Any + Send + Sync` type; gives erased references access to the concrete type.
pub trait Request: Any + Send + Sync {
    /// Token for the concrete runtime type, even behind `dyn ResultCommand<R>`.
    fn type_info(&self) -> TypeInfo;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Any + Send + Sync> Request for T {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// Command that produces no result. Handled by exactly one `CommandHandler`.
/// Use `#[derive(Command)]` instead of writing `impl Command for T {}`.
pub trait Command: Request {}

/// Command producing `R`. The result type is part of the command's type, so a
/// `Box<dyn ResultCommand<R>>` can still be routed to its handler.
/// Use `#[derive(Command)]` with `#[command(result = R)]`.
pub trait ResultCommand<R>: Request {}

/// Read-only request producing `R`. Use `#[derive(Query)]` with `#[query(result = R)]`.
pub trait Query<R>: Request {}

/// Broadcast notification. Zero or more `EventHandler`s may observe it.
pub trait Event: Request {}
