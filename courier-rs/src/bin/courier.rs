//! CLI for courier-rs: scaffold a request type with its handler.

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};

fn snake_case(s: &str) -> String {
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Parser)]
#[command(name = "courier")]
#[command(about = "Courier Rust CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Command,
    Query,
    Event,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a request and its handler to a context directory (writes <context>/<request>.rs).
    AddHandler {
        /// Context directory (e.g. orders)
        context: String,
        /// Request name in PascalCase (e.g. CreateOrder)
        request: String,
        #[arg(long, value_enum, default_value = "command")]
        kind: Kind,
        /// Result type; required for queries, turns a command into a result-bearing one
        #[arg(long)]
        result: Option<String>,
    },
}

const COMMAND_RS: &str = r#"//! REQUEST: command and handler.
use courier_rs::{CancellationToken, Command, CommandHandler, HandlerError, Inject, Registrar, RegistrationError};

#[derive(Clone, Debug, Command)]
pub struct REQUEST {}

#[derive(Inject)]
pub struct REQUESTHandler;

#[courier_rs::async_trait]
impl CommandHandler<REQUEST> for REQUESTHandler {
    async fn handle(&self, _command: REQUEST, _cancel: CancellationToken) -> Result<(), HandlerError> {
        Ok(())
    }
}

pub fn register(cqrs: &mut Registrar<'_>) -> Result<(), RegistrationError> {
    cqrs.add_command_handler::<REQUEST, REQUESTHandler>(None)?;
    Ok(())
}
"#;

const RESULT_COMMAND_RS: &str = r#"//! REQUEST: command and handler.
use courier_rs::{CancellationToken, Command, HandlerError, Inject, Registrar, RegistrationError, ResultCommandHandler};

#[derive(Clone, Debug, Command)]
#[command(result = RESULT)]
pub struct REQUEST {}

#[derive(Inject)]
pub struct REQUESTHandler;

#[courier_rs::async_trait]
impl ResultCommandHandler<REQUEST, RESULT> for REQUESTHandler {
    async fn handle(&self, _command: REQUEST, _cancel: CancellationToken) -> Result<RESULT, HandlerError> {
        todo!("handle REQUEST")
    }
}

pub fn register(cqrs: &mut Registrar<'_>) -> Result<(), RegistrationError> {
    cqrs.add_result_command_handler::<REQUEST, RESULT, REQUESTHandler>(None)?;
    Ok(())
}
"#;

const QUERY_RS: &str = r#"//! REQUEST: query and handler.
use courier_rs::{CancellationToken, HandlerError, Inject, Query, QueryHandler, Registrar, RegistrationError};

#[derive(Clone, Debug, Query)]
#[query(result = RESULT)]
pub struct REQUEST {}

#[derive(Inject)]
pub struct REQUESTHandler;

#[courier_rs::async_trait]
impl QueryHandler<REQUEST, RESULT> for REQUESTHandler {
    async fn handle(&self, _query: REQUEST, _cancel: CancellationToken) -> Result<RESULT, HandlerError> {
        todo!("handle REQUEST")
    }
}

pub fn register(cqrs: &mut Registrar<'_>) -> Result<(), RegistrationError> {
    cqrs.add_query_handler::<REQUEST, RESULT, REQUESTHandler>(None)?;
    Ok(())
}
"#;

const EVENT_RS: &str = r#"//! REQUEST: event and handler.
use courier_rs::{CancellationToken, Event, EventHandler, HandlerError, Inject, Registrar, RegistrationError};

#[derive(Clone, Debug, Event)]
pub struct REQUEST {}

#[derive(Inject)]
pub struct REQUESTHandler;

#[courier_rs::async_trait]
impl EventHandler<REQUEST> for REQUESTHandler {
    async fn handle(&self, _event: &REQUEST, _cancel: CancellationToken) -> Result<(), HandlerError> {
        Ok(())
    }
}

pub fn register(cqrs: &mut Registrar<'_>) -> Result<(), RegistrationError> {
    cqrs.add_event_handler::<REQUEST, REQUESTHandler>(None)?;
    Ok(())
}
"#;

fn template(kind: Kind, result: Option<&str>) -> Result<&'static str, String> {
    match (kind, result) {
        (Kind::Command, None) => Ok(COMMAND_RS),
        (Kind::Command, Some(_)) => Ok(RESULT_COMMAND_RS),
        (Kind::Query, Some(_)) => Ok(QUERY_RS),
        (Kind::Query, None) => Err("a query needs --result <Type>".into()),
        (Kind::Event, None) => Ok(EVENT_RS),
        (Kind::Event, Some(_)) => Err("events do not produce a result; drop --result".into()),
    }
}

fn replace_template(template: &str, request: &str, result: Option<&str>) -> String {
    let out = template.replace("REQUEST", request);
    match result {
        Some(result) => out.replace("RESULT", result),
        None => out,
    }
}

fn run_add_handler(
    context: &str,
    request: &str,
    kind: Kind,
    result: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let template = template(kind, result)?;
    let request_snake = snake_case(request);
    let dir = Path::new(context);
    fs::create_dir_all(dir)?;

    let file = dir.join(format!("{}.rs", request_snake));
    if file.exists() {
        return Err(format!("{} already exists", file.display()).into());
    }
    fs::write(&file, replace_template(template, request, result))?;

    println!("Generated {}", file.display());
    println!(
        "Add to your setup: mod {}; add_cqrs(&mut services, options, |cqrs| {}::{}::register(cqrs))?;",
        context, context, request_snake
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::AddHandler {
            context,
            request,
            kind,
            result,
        } => run_add_handler(&context, &request, kind, result.as_deref()),
    }
}
