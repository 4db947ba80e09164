// ABOUTME: Entry point for the dockhand CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use dockhand::config::Config;
use dockhand::engine::{BollardEngine, EngineClient};
use dockhand::error::Result;
use dockhand::inventory::{ContainerFilter, Inventory, refresh_all};
use dockhand::translate::{self, ContainerCreateOptions, FsEnvFileReader};
use dockhand::types::EngineId;
use output::{EngineStatus, Output, OutputMode};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Engines { json } => {
            let session = Session::connect(&load_config(cli.config.as_deref())?).await?;
            let mut rows = Vec::with_capacity(session.engines.len());
            for engine in &session.engines {
                let reachable = match engine.client.ping().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("engine {} is not responding: {}", engine.id, e);
                        false
                    }
                };
                if let Some(connection) = session.inventory.engine(&engine.id) {
                    rows.push(EngineStatus {
                        connection,
                        socket: engine.socket.clone(),
                        reachable,
                    });
                }
            }
            Output::new(OutputMode::from_flag(json)).engines(&rows);
            Ok(())
        }
        Commands::Ps {
            engine,
            state,
            name,
            labels,
            json,
        } => {
            let mut filter = ContainerFilter::all();
            if let Some(id) = engine {
                filter = filter.engine(EngineId::new(id));
            }
            if let Some(state) = state {
                filter = filter.state(state);
            }
            if let Some(name) = name {
                filter = filter.name(name);
            }
            for label in labels {
                let (key, value) = label.split_once('=').unwrap_or((label.as_str(), ""));
                filter = filter.label(key, value);
            }

            let session = Session::connect(&load_config(cli.config.as_deref())?).await?;
            session.refresh().await;
            let containers: Vec<_> = session.inventory.query(filter).collect();
            Output::new(OutputMode::from_flag(json)).containers(&containers);
            Ok(())
        }
        Commands::Pods { engine, json } => {
            let session = Session::connect(&load_config(cli.config.as_deref())?).await?;
            session.refresh().await;
            let engine = engine.map(EngineId::new);
            let pods = session.inventory.pods(engine.as_ref());
            Output::new(OutputMode::from_flag(json)).pods(&pods);
            Ok(())
        }
        Commands::Create {
            engine,
            file,
            dry_run,
        } => {
            let options = read_create_options(&file)?;
            let payload = translate::translate(options, &FsEnvFileReader)?;

            if dry_run {
                output::print_json(&payload);
                return Ok(());
            }

            let engine_id = EngineId::new(engine.unwrap_or_default());
            let session = Session::connect(&load_config(cli.config.as_deref())?).await?;
            let connection = session.inventory.resolve(&engine_id)?;
            let client = session.client(&engine_id)?;

            let id = client.create_and_start(&payload).await?;
            if payload.start {
                println!("Started {} on {}", id, connection.name);
            } else {
                println!("Created {} on {}", id, connection.name);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = std::env::current_dir().map_err(dockhand::config::ConfigError::from)?;
            Config::discover_or_default(&cwd)?
        }
    };
    Ok(config)
}

fn read_create_options(path: &Path) -> Result<ContainerCreateOptions> {
    let content = std::fs::read_to_string(path).map_err(dockhand::config::ConfigError::from)?;
    let options =
        serde_yaml::from_str(&content).map_err(dockhand::config::ConfigError::from)?;
    Ok(options)
}

struct ConnectedEngine {
    id: EngineId,
    socket: String,
    client: Arc<dyn EngineClient>,
}

/// Registered engines and their clients for one CLI invocation.
struct Session {
    inventory: Inventory,
    engines: Vec<ConnectedEngine>,
}

impl Session {
    async fn connect(config: &Config) -> Result<Self> {
        let inventory = Inventory::new();
        let mut engines = Vec::new();

        for resolved in config.endpoints() {
            let client = match BollardEngine::connect(&resolved.endpoint, config.request_timeout)
            {
                Ok(client) => client,
                Err(e) => {
                    tracing::warn!(
                        "skipping engine {} at {}: {}",
                        resolved.connection.id,
                        resolved.endpoint.socket_path,
                        e
                    );
                    continue;
                }
            };
            let connection = inventory.register(resolved.connection)?;
            engines.push(ConnectedEngine {
                id: connection.id,
                socket: resolved.endpoint.socket_path,
                client: Arc::new(client),
            });
        }

        if engines.is_empty() {
            tracing::warn!("no container engines configured or detected");
        }

        Ok(Self { inventory, engines })
    }

    async fn refresh(&self) {
        let clients: Vec<(EngineId, Arc<dyn EngineClient>)> = self
            .engines
            .iter()
            .map(|e| (e.id.clone(), Arc::clone(&e.client)))
            .collect();
        for report in refresh_all(&self.inventory, &clients).await.into_iter().flatten() {
            if !report.failures.is_empty() {
                tracing::warn!(
                    "engine {}: {} container(s) could not be read",
                    report.engine_id,
                    report.failures.len()
                );
            }
        }
    }

    fn client(&self, id: &EngineId) -> Result<Arc<dyn EngineClient>> {
        self.engines
            .iter()
            .find(|e| &e.id == id)
            .map(|e| Arc::clone(&e.client))
            .ok_or_else(|| dockhand::engine::RegistryError::StaleEngine(id.clone()).into())
    }
}
