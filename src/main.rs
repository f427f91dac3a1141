//! Waypoint CLI
//!
//! Command-line interface for inspecting a route configuration:
//! - List routes in priority order
//! - Match a location
//! - Build a path from a route name
//! - Replay a sequence of navigations

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use waypoint::config::generate_default_config;
use waypoint::{Application, Config, LoggingConfig, NavigateOptions, QueryMap, Resolution};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and exercise a client-side route configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Route configuration file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List routes in match order
    Routes,

    /// Match a location against the table
    Match {
        /// Location, e.g. /albums/12?sort=track
        location: String,
    },

    /// Build a path from a route name
    Resolve {
        /// Route name
        name: String,
        /// Parameters in key=value format
        #[arg(short, long)]
        param: Vec<String>,
        /// Query entries in key=value format
        #[arg(short, long)]
        query: Vec<String>,
    },

    /// Navigate through locations and report the resulting state
    Replay {
        /// Locations to visit in order; "back" and "forward" traverse history
        locations: Vec<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = cli.format == "json";

    match cli.command {
        Commands::Config { output } => {
            write_default_config(output.as_deref())?;
        }

        Commands::Routes => {
            let app = bootstrap(cli.config.as_deref())?;
            let table = app.router().table();
            if json {
                let routes: Vec<_> = table
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "name": r.name(),
                            "pattern": r.pattern().as_str(),
                            "view": r.view(),
                            "redirect": r.redirect().map(|p| p.as_str()),
                            "meta": r.meta(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else {
                println!("{:<4} {:<20} {:<28} {}", "#", "Name", "Pattern", "View");
                println!("{}", "-".repeat(70));
                for (i, route) in table.iter().enumerate() {
                    let view = match route.redirect() {
                        Some(target) => format!("→ {}", target),
                        None => route.view().to_string(),
                    };
                    println!(
                        "{:<4} {:<20} {:<28} {}",
                        i,
                        route.name(),
                        route.pattern().as_str(),
                        view
                    );
                }
            }
        }

        Commands::Match { location } => {
            let app = bootstrap(cli.config.as_deref())?;
            app.router().navigate_to(&location, NavigateOptions::silent());
            print_resolution(&app.router().current(), json)?;
        }

        Commands::Resolve { name, param, query } => {
            let app = bootstrap(cli.config.as_deref())?;
            let params: HashMap<String, String> = parse_pairs(&param)?.into_iter().collect();
            let query: QueryMap = parse_pairs(&query)?.into_iter().collect();
            let path = app.router().resolve_with_query(&name, &params, &query)?;
            if json {
                println!("{}", serde_json::json!({ "name": name, "path": path }));
            } else {
                println!("{}", path);
            }
        }

        Commands::Replay { locations } => {
            let app = bootstrap(cli.config.as_deref())?.with_history();
            let router = app.router();
            let _logger = router.subscribe(|event| {
                tracing::info!(
                    requested = %event.requested,
                    resolution = %event.current,
                    replace = event.options.replace,
                    "Navigation"
                );
                Ok(())
            });

            if let Some(history) = app.history() {
                for location in &locations {
                    match location.as_str() {
                        "back" => {
                            if !history.back() {
                                eprintln!("Already at the oldest entry");
                            }
                        }
                        "forward" => {
                            if !history.forward() {
                                eprintln!("Already at the newest entry");
                            }
                        }
                        _ => router.navigate_to(location, NavigateOptions::push()),
                    }
                }

                print_resolution(&router.current(), json)?;
                if !json {
                    println!();
                    println!("History:");
                    for (i, entry) in history.entries().iter().enumerate() {
                        let marker = if i == history.index() { ">" } else { " " };
                        println!(
                            "{} {:<3} {:<30} {}",
                            marker,
                            i,
                            entry.location,
                            entry.visited_at.format("%H:%M:%S%.3f")
                        );
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load config, start logging and wire the application
fn bootstrap(path: Option<&Path>) -> anyhow::Result<Application> {
    let config = match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);
    Ok(Application::bootstrap(&config)?)
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let content = generate_default_config();
    match output {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
            println!("Config written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Initialize tracing from config, letting RUST_LOG take precedence
fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("waypoint={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_pairs(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("expected key=value, got '{}'", pair))
        })
        .collect()
}

fn print_resolution(resolution: &Resolution, json: bool) -> anyhow::Result<()> {
    if json {
        let value = match resolution {
            Resolution::Matched(m) => serde_json::json!({
                "status": "matched",
                "route": m.route.name(),
                "view": m.route.view(),
                "path": m.path,
                "params": m.params,
                "query": m.query,
                "meta": m.route.meta(),
            }),
            Resolution::NotFound { path, query } => serde_json::json!({
                "status": "not_found",
                "path": path,
                "query": query,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match resolution {
        Resolution::Matched(m) => {
            println!("Route:  {}", m.route.name());
            println!("View:   {}", m.route.view());
            println!("Path:   {}", m.path);
            let mut params: Vec<_> = m.params.iter().collect();
            params.sort();
            for (key, value) in params {
                println!("  :{} = {}", key, value);
            }
            let query = m.query.to_query_string();
            if !query.is_empty() {
                println!("Query:  {}", query);
            }
        }
        Resolution::NotFound { path, .. } => {
            println!("No route matches '{}'", path);
        }
    }
    Ok(())
}
