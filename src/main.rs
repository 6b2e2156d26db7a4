//! Script Router (v1)
//!
//! Entry point invoked once per request, typically as the CGI script the
//! web server rewrites every request to.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    SCRIPT ROUTER                     │
//!   CGI env / flags  │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!   ─────────────────┼─▶│ request │───▶│ resolver │───▶│   routing    │     │
//!                    │  │ source  │    │   bind   │    │ table+pattern│     │
//!                    │  └─────────┘    └────┬─────┘    └──────┬───────┘     │
//!                    │                      │ detour/abort    │ match       │
//!                    │                      ▼                 ▼             │
//!   exit code        │               ┌───────────────────────────────┐      │
//!   ◀────────────────┼───────────────│ exec (ScriptHost, Termination)│──────┼──▶ handler
//!                    │               └───────────────────────────────┘      │    script
//!                    │  ┌────────────────────────────────────────────────┐  │
//!                    │  │ config (TOML) · observability · render         │  │
//!                    │  └────────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use script_router::config::load_routes;
use script_router::exec::ProcessHost;
use script_router::observability;
use script_router::request::{CgiEnv, Origin, RequestInput, ServerMeta, StaticMeta};
use script_router::routing::RouteTable;
use script_router::Resolver;

#[derive(Parser)]
#[command(name = "script-router")]
#[command(about = "Resolve a request to a handler script and run it", long_about = None)]
struct Cli {
    /// Routing configuration file (TOML).
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    /// Additional configuration files appended in order.
    #[arg(long = "append")]
    append: Vec<PathBuf>,

    /// Directory handler paths are resolved against (default: the
    /// configuration file's directory).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Request parameter carrying the route.
    #[arg(short, long, default_value = "route")]
    param: String,

    /// Input origin the parameter may come from.
    #[arg(long, value_enum, default_value_t = OriginArg::Request)]
    origin: OriginArg,

    /// POST input as NAME=VALUE.
    #[arg(long = "post", value_parser = parse_pair)]
    post: Vec<(String, String)>,

    /// GET input as NAME=VALUE.
    #[arg(long = "get", value_parser = parse_pair)]
    get: Vec<(String, String)>,

    /// Request URI (default: $REQUEST_URI).
    #[arg(long)]
    request_uri: Option<String>,

    /// Invoked script path (default: $SCRIPT_FILENAME).
    #[arg(long)]
    script_filename: Option<String>,

    /// Return after a handler runs instead of exiting with its code.
    #[arg(long = "continue")]
    keep_going: bool,

    /// Log every executed handler.
    #[arg(long)]
    debug: bool,

    /// Print the resolution state as JSON on stderr.
    #[arg(long)]
    report: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OriginArg {
    Post,
    Get,
    Request,
}

impl From<OriginArg> for Origin {
    fn from(arg: OriginArg) -> Self {
        match arg {
            OriginArg::Post => Origin::Post,
            OriginArg::Get => Origin::Get,
            OriginArg::Request => Origin::Request,
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut table = RouteTable::new();
    let mut settings = load_routes(&mut table, &cli.config, cli.base_dir.as_deref(), false)?;
    for extra in &cli.append {
        // Settings come from the primary file only.
        load_routes(&mut table, extra, cli.base_dir.as_deref().or(cli.config.parent()), true)?;
    }
    if cli.debug {
        settings.debug = true;
    }

    observability::logging::init(&settings.log_level);

    tracing::info!(
        config = %cli.config.display(),
        routes = table.len(),
        auto_detect = settings.auto_detect,
        "Configuration loaded"
    );

    let mut input = RequestInput::new();
    for (name, value) in &cli.post {
        input.insert(Origin::Post, name.as_str(), value.as_str());
    }
    for (name, value) in &cli.get {
        input.insert(Origin::Get, name.as_str(), value.as_str());
    }

    let meta: Box<dyn ServerMeta> = if cli.request_uri.is_some() || cli.script_filename.is_some() {
        Box::new(StaticMeta::new(
            cli.script_filename.as_deref(),
            cli.request_uri.as_deref(),
        ))
    } else {
        Box::new(CgiEnv)
    };

    let host = ProcessHost::new(settings.interpreters.clone());
    let mut resolver = Resolver::new(table, settings, Box::new(host))
        .with_input(input)
        .with_meta(meta);

    let flow = resolver.resolve(&cli.param, cli.origin.into(), cli.keep_going);

    if cli.report {
        eprintln!("{}", serde_json::to_string_pretty(&resolver.snapshot())?);
    }

    match flow {
        ControlFlow::Break(termination) => {
            if cli.report {
                eprintln!("{}", serde_json::to_string_pretty(&termination)?);
            }
            tracing::info!(exit_code = termination.exit_code(), "Request finished");
            std::process::exit(termination.exit_code());
        }
        ControlFlow::Continue(matched) => {
            tracing::info!(matched, "Resolution returned control");
            Ok(())
        }
    }
}
