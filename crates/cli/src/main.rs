use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;
use stitch_api::{ApiRequest, CookieJar, CredentialSource};
use stitch_engine::{LookupOrchestrator, StitchConfig, load_config, load_config_from_path};
use stitch_types::LookupConfig;
use stitch_util::redact_sensitive;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "stitch", version, about = "Resolve dashboard lookup fields and call the dashboard API")]
struct Cli {
    /// Configuration file (defaults to STITCH_CONFIG_PATH or ~/.config/stitch/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the configured lookup fields and print the snapshot as JSON
    Lookup {
        /// Only resolve these field paths (repeatable)
        #[arg(long = "field")]
        fields: Vec<String>,
    },
    /// Issue one API request and print the decoded JSON
    Request {
        endpoint: String,
        #[arg(long, default_value = "GET")]
        method: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        slug: Option<String>,
        #[arg(long)]
        id: Option<String>,
        /// Send the request without an Authorization header
        #[arg(long)]
        no_auth: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_from_path(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Lookup { fields } => run_lookup(config, &fields).await,
        Command::Request {
            endpoint,
            method,
            body,
            slug,
            id,
            no_auth,
        } => {
            let mut request = ApiRequest::new(parse_method(&method)?, endpoint).with_auth(!no_auth);
            if let Some(body) = body {
                let value: Value = serde_json::from_str(&body).context("--body must be valid JSON")?;
                request = request.json(value);
            }
            if let Some(slug) = slug {
                request = request.slug(slug);
            }
            if let Some(id) = id {
                request = request.id(id);
            }
            run_request(config, request).await
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn credentials() -> Arc<dyn CredentialSource> {
    let jar = CookieJar::from_env();
    if jar.bearer_token().is_none() {
        warn!("STITCH_COOKIE has no refresh_token; requests are sent without Authorization");
    }
    Arc::new(jar)
}

async fn run_lookup(config: StitchConfig, only: &[String]) -> Result<()> {
    let client = config.api.build_client(credentials())?;
    let fields = select_fields(&config, only)?;
    if fields.is_empty() {
        warn!("no lookup fields configured");
    }

    let orchestrator = LookupOrchestrator::new(Arc::new(client), config.lookups.clone());
    let snapshot = tokio::select! {
        snapshot = orchestrator.resolve_all(fields) => snapshot,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, cancelling pending lookups");
            orchestrator.shutdown();
            orchestrator.snapshot()
        }
    };
    info!(
        resolved = snapshot.options.len(),
        failed = snapshot.errors.len(),
        peak_in_flight = orchestrator.peak_in_flight(),
        "lookups finished"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn run_request(config: StitchConfig, request: ApiRequest) -> Result<()> {
    let client = config.api.build_client(credentials())?;
    debug!(method = %request.method, url = %client.request_url(&request), "sending request");
    let value = client.request(request).await?;
    let output = serde_json::to_string_pretty(&value)?;
    debug!(body = %redact_sensitive(&output), "response decoded");
    println!("{output}");
    Ok(())
}

/// Configured fields to resolve; all of them when `only` is empty.
fn select_fields(config: &StitchConfig, only: &[String]) -> Result<Vec<(String, LookupConfig)>> {
    if only.is_empty() {
        return Ok(config.fields.iter().map(|(path, lookup)| (path.clone(), lookup.clone())).collect());
    }
    only.iter()
        .map(|path| {
            config
                .fields
                .get(path)
                .map(|lookup| (path.clone(), lookup.clone()))
                .with_context(|| format!("unknown lookup field: {path}"))
        })
        .collect()
}

fn parse_method(method: &str) -> Result<Method> {
    match method.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        other => bail!("unsupported method: {}", other),
    }
}
