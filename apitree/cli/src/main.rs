//! apitree CLI - inspect and call REST APIs from their descriptions

mod route_expr;

use std::process::ExitCode;
use std::time::Duration;

use apitree::{
    ApiError, ApiResponse, HttpTransport, RequestOptions, ResponseBody, RestMethod,
    TransportError, create_client_with,
};
use apitree::tree::RouteNode;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::route_expr::{ResolveError, RouteExprError};

#[derive(Parser)]
#[command(name = "apitree")]
#[command(version)]
#[command(about = "Inspect and call REST APIs straight from their descriptions", long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    log_verbosity: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(long, env = "APITREE_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route tree with each route's methods
    Tree {
        /// Description file path or http(s) URL
        #[arg(value_name = "LOCATION")]
        location: String,
    },

    /// Invoke one route
    ///
    /// ROUTE is a property chain such as `collection.collectionId(123)`, or a
    /// root call with an ad hoc path such as `(/test/{id})`.
    Call {
        /// Description file path or http(s) URL
        #[arg(value_name = "LOCATION")]
        location: String,

        /// Route expression
        #[arg(value_name = "ROUTE")]
        route: String,

        /// HTTP method
        #[arg(short = 'X', long = "request", value_name = "METHOD", default_value = "get")]
        method: RestMethod,

        /// Query parameter (repeatable: -q limit=10 -q tag=a)
        #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        /// Request header (repeatable: -H 'Accept: text/plain')
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
        headers: Vec<String>,

        /// URI parameter (repeatable)
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Base URI parameter (repeatable)
        #[arg(short = 'b', long = "base-param", value_name = "NAME=VALUE")]
        base_params: Vec<String>,

        /// Request body; parsed as JSON when possible, otherwise sent verbatim
        #[arg(short = 'd', long = "data", value_name = "BODY")]
        data: Option<String>,

        /// Print response headers
        #[arg(short = 'i', long = "include")]
        include: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("invalid route expression: {0}")]
    RouteExpr(#[from] RouteExprError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("invalid {flag} value '{input}': expected {expected}")]
    InvalidPair {
        flag: &'static str,
        input: String,
        expected: &'static str,
    },
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v flags
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            // Default: warnings only, stdout carries the response
            0 => "warn".to_string(),
            // -v: the call being made
            1 => "warn,apitree_cli=info".to_string(),
            // -vv: tree construction, config changes and the request span
            2 => "warn,apitree_cli=debug,apitree=debug".to_string(),
            // -vvv+: composed request descriptors too
            _ => "warn,apitree_cli=trace,apitree=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        // JSON output for structured log processing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Human-readable console output to stderr
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

fn split_pair<'a>(
    flag: &'static str,
    input: &'a str,
    separator: char,
) -> Result<(&'a str, &'a str), CliError> {
    let expected = if separator == ':' { "'NAME: VALUE'" } else { "NAME=VALUE" };
    match input.split_once(separator) {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(CliError::InvalidPair {
            flag,
            input: input.to_string(),
            expected,
        }),
    }
}

/// Folds repeated `-q` pairs into a query object; repeated keys become arrays.
fn query_object(pairs: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut query = Map::new();
    for pair in pairs {
        let (key, value) = split_pair("-q", pair, '=')?;
        let value = Value::String(value.to_string());
        match query.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                query.insert(key.to_string(), value);
            }
        }
    }
    Ok(query)
}

fn body_value(data: &str) -> Value {
    serde_json::from_str(data).unwrap_or_else(|_| Value::String(data.to_string()))
}

fn print_node(node: &RouteNode, depth: usize) {
    let methods: Vec<String> = node.methods().map(|m| m.to_string()).collect();
    if depth == 0 {
        println!("/  [{}]", methods.join(", "));
    } else {
        println!(
            "{}{}  [{}]",
            "  ".repeat(depth),
            node.path(),
            methods.join(", ")
        );
    }

    for entry in node.entries() {
        for child in entry.named().into_iter().chain(entry.variables()) {
            print_node(child, depth + 1);
        }
    }
}

fn print_response(response: &ApiResponse, include: bool) {
    println!("HTTP {}", response.status());
    if include {
        for (name, value) in response.headers() {
            println!("{name}: {value}");
        }
    }
    println!();

    match response.body() {
        ResponseBody::Json(value) | ResponseBody::Yaml(value) => {
            match serde_json::to_string_pretty(value) {
                Ok(pretty) => println!("{pretty}"),
                Err(_) => println!("{value}"),
            }
        }
        ResponseBody::Text(text) => {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        ResponseBody::Binary(bytes) => println!("<{} bytes of binary data>", bytes.len()),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let transport = HttpTransport::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .build()?;

    match cli.command {
        Commands::Tree { location } => {
            let client = create_client_with("apitree", &location, transport).await?;
            print_node(client.tree().root(), 0);
        }
        Commands::Call {
            location,
            route,
            method,
            query,
            headers,
            params,
            base_params,
            data,
            include,
        } => {
            let steps = route_expr::parse(&route)?;
            let client = create_client_with("apitree", &location, transport).await?;
            let target = route_expr::resolve(&client, &steps)?;

            let mut options = RequestOptions::new();
            let query = query_object(&query)?;
            if !query.is_empty() {
                options = options.query(Value::Object(query));
            }
            for header in &headers {
                let (name, value) = split_pair("-H", header, ':')?;
                options = options.header(name, value);
            }
            for param in &params {
                let (name, value) = split_pair("-p", param, '=')?;
                options = options.uri_parameter(name, value);
            }
            for param in &base_params {
                let (name, value) = split_pair("-b", param, '=')?;
                options = options.base_uri_parameter(name, value);
            }

            let lead = data.as_deref().map(body_value);
            if lead.is_some() && !method.accepts_body() {
                tracing::warn!(%method, "ignoring request body for a method without one");
            }
            let lead = lead.filter(|_| method.accepts_body());

            tracing::info!(%method, route = %target.template(), "calling route");
            let response = target.request(method, lead, &options).await?;
            print_response(&response, include);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_verbosity, cli.json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
