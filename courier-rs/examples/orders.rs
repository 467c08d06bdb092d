//! Example: an orders context with a result-bearing command, a query and two event handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use courier_rs::{
    add_cqrs, async_trait, CancellationToken, Command, CqrsOptions, Dispatchers, Event,
    EventHandler, HandlerError, Inject, Query, QueryHandler, ResultCommand, ResultCommandHandler,
    ServiceCollection,
};

#[derive(Clone, Debug)]
struct Order {
    id: u64,
    sku: String,
}

#[derive(Default)]
struct OrderStore {
    orders: Mutex<HashMap<u64, Order>>,
}

#[derive(Debug, Command)]
#[command(result = u64)]
struct CreateOrder {
    sku: String,
}

#[derive(Debug, Query)]
#[query(result = Option<Order>)]
struct GetOrder {
    id: u64,
}

#[derive(Debug, Event)]
struct OrderPlaced {
    id: u64,
}

#[derive(Inject)]
struct CreateOrderHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl ResultCommandHandler<CreateOrder, u64> for CreateOrderHandler {
    async fn handle(&self, command: CreateOrder, _cancel: CancellationToken) -> Result<u64, HandlerError> {
        let mut orders = self.store.orders.lock().map_err(|e| e.to_string())?;
        let id = orders.len() as u64 + 1;
        orders.insert(id, Order { id, sku: command.sku });
        Ok(id)
    }
}

#[derive(Inject)]
struct GetOrderHandler {
    store: Arc<OrderStore>,
}

#[async_trait]
impl QueryHandler<GetOrder, Option<Order>> for GetOrderHandler {
    async fn handle(&self, query: GetOrder, _cancel: CancellationToken) -> Result<Option<Order>, HandlerError> {
        let orders = self.store.orders.lock().map_err(|e| e.to_string())?;
        Ok(orders.get(&query.id).cloned())
    }
}

#[derive(Inject)]
struct SendConfirmation;

#[async_trait]
impl EventHandler<OrderPlaced> for SendConfirmation {
    async fn handle(&self, event: &OrderPlaced, _cancel: CancellationToken) -> Result<(), HandlerError> {
        println!("  confirmation sent for order {}", event.id);
        Ok(())
    }
}

#[derive(Inject)]
struct ReserveStock;

#[async_trait]
impl EventHandler<OrderPlaced> for ReserveStock {
    async fn handle(&self, event: &OrderPlaced, _cancel: CancellationToken) -> Result<(), HandlerError> {
        println!("  stock reserved for order {}", event.id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let options = CqrsOptions::default();
    let mut services = ServiceCollection::new();
    services.register_instance(OrderStore::default());
    add_cqrs(&mut services, options.clone(), |cqrs| {
        cqrs.add_result_command_handler::<CreateOrder, u64, CreateOrderHandler>(None)?
            .add_query_handler::<GetOrder, Option<Order>, GetOrderHandler>(None)?
            .add_event_handler::<OrderPlaced, SendConfirmation>(None)?
            .add_event_handler::<OrderPlaced, ReserveStock>(None)?;
        Ok(())
    })?;
    let container = services.build();

    let scope = container.create_scope();
    let dispatch = Dispatchers::for_scope(&scope, &options);
    let cancel = CancellationToken::new();

    let id: u64 = dispatch
        .commands
        .dispatch_with_result(CreateOrder { sku: "A1".into() }, cancel.clone())
        .await?;
    println!("created order {}", id);

    dispatch.events.dispatch(OrderPlaced { id }, cancel.clone()).await?;

    // The erased path only knows the result type.
    let query: Box<dyn Query<Option<Order>>> = Box::new(GetOrder { id });
    match dispatch.queries.dispatch_erased(query, cancel.clone()).await? {
        Some(order) => println!("order {} holds {}", order.id, order.sku),
        None => println!("order {} not found", id),
    }

    let erased: Box<dyn ResultCommand<u64>> = Box::new(CreateOrder { sku: "B2".into() });
    let second = dispatch.commands.dispatch_erased(erased, cancel).await?;
    println!("created order {}", second);
    Ok(())
}
