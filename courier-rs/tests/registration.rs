//! Registrar and handler type resolution.

use std::sync::Arc;

use courier_rs::{
    add_cqrs, async_trait, find_request_capability, handler_service_type, AmbiguityPolicy,
    CancellationToken, Capability, CapabilityShape, Command, CommandHandler, ContainerError,
    CqrsOptions, DeclaresCapabilities, Dispatchers, Event, EventHandler, FailurePolicy,
    HandlerError, Inject, Lifetime, Query, QueryHandler, RegistrationError, ServiceCollection,
    ServiceResolver, TypeInfo,
};

#[derive(Debug, Command)]
struct CreateOrder;

#[derive(Debug, Query)]
#[query(result = u32)]
struct CountOrders;

#[derive(Debug, Event)]
struct OrderPlaced;

trait Auditable {}

#[derive(Inject)]
struct CreateOrderHandler;

#[async_trait]
impl CommandHandler<CreateOrder> for CreateOrderHandler {
    async fn handle(&self, _command: CreateOrder, _cancel: CancellationToken) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl Auditable for CreateOrderHandler {}

impl DeclaresCapabilities for CreateOrderHandler {
    fn capabilities() -> Vec<Capability<Self>> {
        vec![
            Capability::unrelated::<dyn Auditable>(),
            Capability::command::<CreateOrder>(),
        ]
    }
}

#[derive(Inject)]
struct AuditOnly;

impl Auditable for AuditOnly {}

impl DeclaresCapabilities for AuditOnly {
    fn capabilities() -> Vec<Capability<Self>> {
        vec![Capability::unrelated::<dyn Auditable>()]
    }
}

/// Answers a query and observes an event.
#[derive(Inject)]
struct OrderProjection;

#[async_trait]
impl QueryHandler<CountOrders, u32> for OrderProjection {
    async fn handle(&self, _query: CountOrders, _cancel: CancellationToken) -> Result<u32, HandlerError> {
        Ok(12)
    }
}

#[async_trait]
impl EventHandler<OrderPlaced> for OrderProjection {
    async fn handle(&self, _event: &OrderPlaced, _cancel: CancellationToken) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl DeclaresCapabilities for OrderProjection {
    fn capabilities() -> Vec<Capability<Self>> {
        vec![
            Capability::query::<CountOrders, u32>(),
            Capability::event::<OrderPlaced>(),
        ]
    }
}

fn command_key() -> courier_rs::ServiceKey {
    handler_service_type(CapabilityShape::Command, TypeInfo::of::<CreateOrder>(), None).unwrap()
}

fn query_key() -> courier_rs::ServiceKey {
    handler_service_type(
        CapabilityShape::Query,
        TypeInfo::of::<CountOrders>(),
        Some(TypeInfo::of::<u32>()),
    )
    .unwrap()
}

#[test]
fn typed_registration_binds_the_closed_capability() {
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.add_command_handler::<CreateOrder, CreateOrderHandler>(None)?
            .add_query_handler::<CountOrders, u32, OrderProjection>(None)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(services.len(), 2);
    assert!(services.contains(&command_key()));
    assert!(services.contains(&query_key()));
}

#[test]
fn capability_lookup_skips_unrelated_entries() {
    let capability = find_request_capability::<CreateOrderHandler>(AmbiguityPolicy::Reject).unwrap();

    assert_eq!(capability.shape(), Some(CapabilityShape::Command));
    assert_eq!(capability.type_args(), &[TypeInfo::of::<CreateOrder>()]);
    assert_eq!(capability.service_type().unwrap(), command_key());
}

#[test]
fn register_by_declared_capability() {
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.register_handler::<CreateOrderHandler>(None)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(services.len(), 1);
    assert!(services.contains(&command_key()));
}

#[test]
fn type_without_handler_capability_is_rejected() {
    let mut services = ServiceCollection::new();
    let err = add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.register_handler::<AuditOnly>(None)?;
        Ok(())
    })
    .unwrap_err();

    match &err {
        RegistrationError::NotAValidHandler { handler, .. } => assert!(handler.ends_with("AuditOnly")),
        other => panic!("expected NotAValidHandler, got {:?}", other),
    }
    assert!(err.to_string().contains("AuditOnly is not a valid handler"));
    assert!(services.is_empty());
}

#[test]
fn failed_configure_leaves_services_untouched() {
    let mut services = ServiceCollection::new();
    services.register_instance(12u32);
    let err = add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.add_command_handler::<CreateOrder, CreateOrderHandler>(None)?
            .register_handler::<AuditOnly>(None)?;
        Ok(())
    })
    .unwrap_err();

    assert!(matches!(err, RegistrationError::NotAValidHandler { .. }));
    assert_eq!(services.len(), 1);
    assert!(!services.contains(&command_key()));
}

#[test]
fn several_capabilities_are_rejected_by_default() {
    let mut services = ServiceCollection::new();
    let err = add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.register_handler::<OrderProjection>(None)?;
        Ok(())
    })
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("2 handler capabilities"), "{}", message);
    assert!(message.contains("QueryHandler"), "{}", message);
    assert!(message.contains("EventHandler"), "{}", message);
    assert!(services.is_empty());
}

#[test]
fn first_declared_policy_binds_the_first_capability() {
    let options = CqrsOptions {
        ambiguous_handlers: AmbiguityPolicy::FirstDeclared,
        ..CqrsOptions::default()
    };
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, options, |cqrs| {
        cqrs.register_handler::<OrderProjection>(None)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(services.len(), 1);
    assert!(services.contains(&query_key()));
}

#[test]
fn shape_arity_is_checked() {
    let err = handler_service_type(
        CapabilityShape::Command,
        TypeInfo::of::<CreateOrder>(),
        Some(TypeInfo::of::<u32>()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::InvalidServiceKey {
            open: "CommandHandler",
            ..
        }
    ));

    let err = handler_service_type(CapabilityShape::Query, TypeInfo::of::<CountOrders>(), None)
        .unwrap_err();
    assert!(matches!(err, ContainerError::InvalidServiceKey { .. }));
}

#[test]
fn result_type_is_part_of_the_key() {
    let as_u32 = query_key();
    let as_u64 = handler_service_type(
        CapabilityShape::Query,
        TypeInfo::of::<CountOrders>(),
        Some(TypeInfo::of::<u64>()),
    )
    .unwrap();
    let as_command = handler_service_type(
        CapabilityShape::ResultCommand,
        TypeInfo::of::<CountOrders>(),
        Some(TypeInfo::of::<u32>()),
    )
    .unwrap();

    assert_ne!(as_u32, as_u64);
    assert_ne!(as_u32, as_command);
    assert!(as_u32.to_string().starts_with("QueryHandler<"));
}

fn same_instance(first: &courier_rs::Instance, second: &courier_rs::Instance) -> bool {
    Arc::ptr_eq(first, second)
}

#[test]
fn default_lifetime_comes_from_options() {
    let options = CqrsOptions {
        default_lifetime: Lifetime::Singleton,
        ..CqrsOptions::default()
    };
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, options, |cqrs| {
        cqrs.add_command_handler::<CreateOrder, CreateOrderHandler>(None)?
            .add_query_handler::<CountOrders, u32, OrderProjection>(Some(Lifetime::Transient))?;
        Ok(())
    })
    .unwrap();
    let container = services.build();
    let (a, b) = (container.create_scope(), container.create_scope());

    let command_a = a.resolve_required(&command_key()).unwrap();
    let command_b = b.resolve_required(&command_key()).unwrap();
    assert!(same_instance(&command_a, &command_b));

    let query_a = a.resolve_required(&query_key()).unwrap();
    let query_again = a.resolve_required(&query_key()).unwrap();
    assert!(!same_instance(&query_a, &query_again));
}

#[test]
fn scoped_is_the_default_lifetime() {
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, CqrsOptions::default(), |cqrs| {
        cqrs.add_command_handler::<CreateOrder, CreateOrderHandler>(None)?;
        Ok(())
    })
    .unwrap();
    let container = services.build();
    let (a, b) = (container.create_scope(), container.create_scope());

    let first = a.resolve_required(&command_key()).unwrap();
    let again = a.resolve_required(&command_key()).unwrap();
    let other = b.resolve_required(&command_key()).unwrap();
    assert!(same_instance(&first, &again));
    assert!(!same_instance(&first, &other));
}

#[test]
fn options_parse_from_json() {
    let options = CqrsOptions::from_json_str(
        r#"{"default_lifetime": "transient", "event_failure_policy": "all_errors"}"#,
    )
    .unwrap();
    assert_eq!(options.default_lifetime, Lifetime::Transient);
    assert_eq!(options.event_failure_policy, FailurePolicy::AllErrors);
    assert_eq!(options.ambiguous_handlers, AmbiguityPolicy::Reject);

    assert_eq!(CqrsOptions::from_json_str("{}").unwrap(), CqrsOptions::default());
    assert!(CqrsOptions::from_json_str(r#"{"ambiguous_handlers": "pick_any"}"#).is_err());
}

#[tokio::test]
async fn handler_registered_by_capability_is_dispatchable() {
    let options = CqrsOptions {
        ambiguous_handlers: AmbiguityPolicy::FirstDeclared,
        ..CqrsOptions::default()
    };
    let mut services = ServiceCollection::new();
    add_cqrs(&mut services, options.clone(), |cqrs| {
        cqrs.register_handler::<OrderProjection>(None)?;
        Ok(())
    })
    .unwrap();
    let container = services.build();
    let dispatch = Dispatchers::for_scope(&container.create_scope(), &options);

    let count: u32 = dispatch
        .queries
        .dispatch(CountOrders, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(count, 12);
}
