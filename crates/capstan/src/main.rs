mod cli; // Declare the cli module

use std::path::PathBuf;
use std::process::ExitCode;

use capstan_core::plugin_system::config::ConfigData;
use capstan_core::plugin_system::manager::{DefaultPluginManager, PluginManager};
use clap::{Parser, Subcommand}; // Use clap for argument parsing
use log::warn;

use crate::cli::{print_summary, ConsoleSink};

/// Capstan: a plugin host for service-exposing plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for a basic liveness check
    #[arg(long)]
    ping: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a plugin directory and print the outcome
    Resolve {
        /// Directory containing one subdirectory per plugin
        #[arg(long)]
        plugins_dir: PathBuf,

        /// Optional site configuration file (JSON object)
        #[arg(long)]
        site_config: Option<PathBuf>,

        /// Run the initialization loop over the accepted plugins
        #[arg(long)]
        init: bool,
    },
    /// List the accepted plugins of a directory, in initialization order
    List {
        /// Directory containing one subdirectory per plugin
        #[arg(long)]
        plugins_dir: PathBuf,
    },
}

/// Reads a JSON object file into config data; a missing argument yields
/// an empty scope.
fn load_config(path: Option<&PathBuf>) -> ConfigData {
    let Some(path) = path else {
        return ConfigData::new();
    };
    match std::fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(value) => ConfigData::from_value(&value),
            Err(e) => {
                warn!("Ignoring unparsable config '{}': {}", path.display(), e);
                ConfigData::new()
            }
        },
        Err(e) => {
            warn!("Ignoring unreadable config '{}': {}", path.display(), e);
            ConfigData::new()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    match args.command {
        Some(Commands::Resolve {
            plugins_dir,
            site_config,
            init,
        }) => {
            let manager = DefaultPluginManager::with_sink(Box::new(ConsoleSink));
            let resolution = manager.resolve_directory(&plugins_dir).await;
            print_summary(&resolution);

            if init {
                let site = load_config(site_config.as_ref());
                match manager.initialize_all(&ConfigData::new(), &site).await {
                    Ok(count) => println!("initialized {count} plugin(s)"),
                    Err(e) => {
                        eprintln!("initialization failed: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            // A high rejection count is the host's call, not ours; the
            // run itself completed.
            ExitCode::SUCCESS
        }
        Some(Commands::List { plugins_dir }) => {
            let manager = DefaultPluginManager::new();
            let resolution = manager.resolve_directory(&plugins_dir).await;
            for node in &resolution.accepted {
                match node.declared_version() {
                    Some(version) => println!("{} {}", node.id(), version),
                    None => println!("{}", node.id()),
                }
            }
            ExitCode::SUCCESS
        }
        None => {
            println!("Capstan plugin host. Try --help for available commands.");
            ExitCode::SUCCESS
        }
    }
}
