// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use dockhand::types::ContainerState;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(about = "One container inventory across Docker and Podman engines")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List engine connections and whether they respond
    Engines {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List containers across all engines
    Ps {
        /// Only containers from this engine id
        #[arg(short, long)]
        engine: Option<String>,

        /// Only containers in this state (e.g. running, exited)
        #[arg(short, long)]
        state: Option<ContainerState>,

        /// Only containers whose name contains this text
        #[arg(short, long)]
        name: Option<String>,

        /// Only containers with this label (KEY=VALUE, repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List pods across all engines
    Pods {
        /// Only pods from this engine id
        #[arg(short, long)]
        engine: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create (and by default start) a container from a create-options file
    Create {
        /// Engine id to create the container on
        #[arg(short, long, required_unless_present = "dry_run")]
        engine: Option<String>,

        /// YAML or JSON file with container create options
        file: PathBuf,

        /// Validate and print the engine payload without contacting an engine
        #[arg(long)]
        dry_run: bool,
    },
}
