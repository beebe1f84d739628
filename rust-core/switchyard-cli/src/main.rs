//! # Switchyard CLI
//!
//! Resolve a simulated request against a JSON route manifest, generate links,
//! or preview redirects.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use switchyard_core::telemetry::init_tracing;
use switchyard_core::{
    Error, RecordingTransport, RedirectOutcome, RequestSnapshot, RouteManifest, RouteTable, Scheme,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Resolve requests and generate links from a route manifest", long_about = None)]
struct Cli {
    /// Route manifest (JSON)
    #[arg(short, long)]
    routes: PathBuf,

    /// Request path
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Request method
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request scheme (http or https)
    #[arg(long, default_value = "http")]
    scheme: Scheme,

    /// Request host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select the route for the request and run it
    Resolve,
    /// Generate a link to a route (or rooted path)
    Link {
        /// Route name or path
        name: String,
        /// Parameters as key=value
        params: Vec<String>,
    },
    /// Show the redirect that would be emitted
    Redirect {
        /// Route name, path or absolute URL
        name: String,
        /// Parameters as key=value
        params: Vec<String>,
        /// Pretend response output has already started
        #[arg(long)]
        headers_sent: bool,
    },
    /// List registered routes in priority order
    Routes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let manifest = RouteManifest::load(&cli.routes)
        .with_context(|| format!("failed to load {}", cli.routes.display()))?;
    let config = manifest.config.clone().validate()?;
    let request = RequestSnapshot::from_uri(
        &cli.path,
        &config.document_root,
        &cli.method,
        cli.scheme,
        cli.host.as_str(),
    );
    debug!(path = %request.path(), method = %request.method(), "Request snapshot");

    let table = manifest.build(request).context("invalid route manifest")?;
    if !table.has_any_routes() {
        bail!("no routes defined in {}", cli.routes.display());
    }

    match cli.command {
        Commands::Resolve => resolve(&table)?,
        Commands::Link { name, params } => {
            let params = parse_params(&params)?;
            println!("{}", table.link(&name, &borrowed(&params)));
        }
        Commands::Redirect {
            name,
            params,
            headers_sent,
        } => {
            let params = parse_params(&params)?;
            let mut transport = if headers_sent {
                RecordingTransport::new().with_headers_sent()
            } else {
                RecordingTransport::new()
            };
            match table.redirect(&name, &borrowed(&params), &mut transport) {
                RedirectOutcome::Halted(url) => println!("302 Location: {url}"),
                RedirectOutcome::Refreshed(_) => println!("{}", transport.body),
            }
        }
        Commands::Routes => list_routes(&table),
    }

    Ok(())
}

fn resolve(table: &RouteTable) -> Result<()> {
    match table.dispatch() {
        Ok(handled) => {
            let summary = serde_json::json!({
                "route": handled.route,
                "params": table.params(),
                "output": handled.output,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(Error::NoMatchingRoute { path }) => bail!("404 Not Found: {path}"),
        Err(e) => Err(e.into()),
    }
}

fn list_routes(table: &RouteTable) {
    for route in table.routes() {
        let marker = if table.current() == Some(route.name()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<20} {:<12} {}",
            route.name(),
            route.template().kind(),
            route.template()
        );
    }
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("parameter {pair:?} is not key=value"))
        })
        .collect()
}

fn borrowed(params: &[(String, String)]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}
