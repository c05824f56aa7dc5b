//! regild CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use regild_foundation::{HostConfig, JsonStore};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// regild - extension host for addons and themes
#[derive(Parser, Debug)]
#[command(name = "regild")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file to use instead of the global/project config.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Addons root directory
    #[arg(long)]
    addons_dir: Option<PathBuf>,

    /// Themes root directory
    #[arg(long)]
    themes_dir: Option<PathBuf>,

    /// Directory holding permissions.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the host and hot-reload extensions until Ctrl-C
    Run {
        /// Do not watch the extension directories
        #[arg(long)]
        no_watch: bool,
    },
    /// List discovered addons and themes
    List,
    /// Show or change an extension's permissions
    Permissions {
        /// Extension id
        id: String,

        /// Overwrite the full mask
        #[arg(long)]
        set: Option<u32>,

        /// Grant a permission by name (use_api, extra_info, ...)
        #[arg(long)]
        grant: Vec<String>,

        /// Revoke a permission by name
        #[arg(long)]
        revoke: Vec<String>,
    },
    /// Print the rendered style tree of the enabled themes
    Render,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.addons_dir {
        config.addons_dir = Some(dir);
    }
    if let Some(dir) = args.themes_dir {
        config.themes_dir = Some(dir);
    }
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    config.debug_mode |= args.debug;

    // Initialize logging
    let log_level = if config.debug_mode { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match args.command.unwrap_or(Command::Run { no_watch: false }) {
        Command::Run { no_watch } => {
            if no_watch {
                config.watch = Some(false);
            }
            cli::run(config).await
        }
        Command::List => cli::list(config).await,
        Command::Permissions {
            id,
            set,
            grant,
            revoke,
        } => cli::permissions(&config, &id, set, &grant, &revoke),
        Command::Render => cli::render(config).await,
    }
}

/// `--config`가 있으면 그 파일만, 없으면 글로벌 + 프로젝트 병합
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<HostConfig> {
    let Some(path) = path else {
        return Ok(HostConfig::load()?);
    };

    let dir = path.parent().map(PathBuf::from).unwrap_or_default();
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid config path: {}", path.display()))?;
    Ok(JsonStore::new(dir).load(file)?)
}
