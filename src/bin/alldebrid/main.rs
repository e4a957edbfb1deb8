//! `alldebrid` command line tool.
//!
//! Every command prints its result as pretty JSON on stdout. Errors are
//! printed as `Error: <message>` on stderr with exit status 1.

mod settings;

use alldebrid::error::BatchResult;
use alldebrid::resources::{MagnetStatusFilter, TorrentFile};
use alldebrid::AllDebrid;
use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use settings::Overrides;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "alldebrid")]
#[command(about = "Command line interface for the AllDebrid API", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// API key (overrides the config file)
    #[arg(long, global = true, env = "ALLDEBRID_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API origin, for proxies or test servers
    #[arg(long, global = true, env = "ALLDEBRID_BASE_URL")]
    base_url: Option<String>,

    /// JSON config file (default: ~/.alldebrid)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[arg(long, global = true)]
    max_retries: Option<u32>,

    /// Log requests and retries to stderr
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Account information
    #[command(subcommand)]
    User(UserCommand),
    /// Supported hosts
    Hosts(HostsArgs),
    /// Magnet management
    #[command(subcommand)]
    Magnet(MagnetCommand),
    /// Hoster links
    #[command(subcommand)]
    Link(LinkCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Info,
    Hosts,
    /// Saved links
    Links,
    /// Recently unlocked links
    History,
}

#[derive(Args, Debug)]
struct HostsArgs {
    #[arg(long, conflicts_with = "priority")]
    domains: bool,
    #[arg(long)]
    priority: bool,
}

#[derive(Subcommand, Debug)]
enum MagnetCommand {
    List {
        /// active, ready, expired or error
        #[arg(long)]
        status: Option<MagnetStatusFilter>,
    },
    Get {
        id: u64,
    },
    Upload {
        #[arg(required = true)]
        magnets: Vec<String>,
    },
    UploadFile {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    Restart {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum LinkCommand {
    Info {
        #[arg(required = true)]
        links: Vec<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Unlock {
        link: String,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "alldebrid=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let api = build_api(cli.global)?;
    match cli.command {
        Commands::User(command) => user_command(&api, command).await,
        Commands::Hosts(args) => hosts_command(&api, args).await,
        Commands::Magnet(command) => magnet_command(&api, command).await,
        Commands::Link(command) => link_command(&api, command).await,
    }
}

fn build_api(global: GlobalArgs) -> Result<AllDebrid> {
    let file = settings::load_file_config(global.config.as_deref())?;
    let overrides = Overrides {
        api_key: global.api_key,
        base_url: global.base_url,
        timeout_ms: global.timeout_ms,
        max_retries: global.max_retries,
    };
    let options = settings::resolve(overrides, file)?;
    Ok(AllDebrid::new(options)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("cannot serialize output")?;
    println!("{json}");
    Ok(())
}

async fn user_command(api: &AllDebrid, command: UserCommand) -> Result<()> {
    let users = api.users();
    match command {
        UserCommand::Info => print_json(&users.get().await?),
        UserCommand::Hosts => print_json(&users.hosts().await?),
        UserCommand::Links => print_json(&users.saved_links().await?),
        UserCommand::History => print_json(&users.recent_links().await?),
    }
}

async fn hosts_command(api: &AllDebrid, args: HostsArgs) -> Result<()> {
    let hosts = api.hosts();
    if args.domains {
        print_json(&hosts.domains().await?)
    } else if args.priority {
        print_json(&hosts.priorities().await?)
    } else {
        print_json(&hosts.list().await?)
    }
}

async fn magnet_command(api: &AllDebrid, command: MagnetCommand) -> Result<()> {
    let magnets = api.magnets();
    match command {
        MagnetCommand::List { status } => print_json(&magnets.list(status).await?),
        MagnetCommand::Get { id } => {
            let magnet = magnets.get(id).await?;
            print_json(&json!({ "state": magnet.state(), "magnet": magnet }))
        }
        MagnetCommand::Upload { magnets: uris } => print_json(&magnets.upload(uris).await?),
        MagnetCommand::UploadFile { paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let content = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.torrent".to_string());
                files.push(TorrentFile::new(file_name, content));
            }
            print_json(&magnets.upload_files(files).await?)
        }
        MagnetCommand::Delete { ids } => {
            let results = futures::future::join_all(ids.iter().map(|&id| magnets.delete(id))).await;
            let batch = BatchResult::from_results(results);
            report_batch(&ids, &batch)
        }
        MagnetCommand::Restart { ids } => match ids.as_slice() {
            [id] => print_json(&magnets.restart(*id).await?),
            _ => print_json(&magnets.restart_many(&ids).await?),
        },
    }
}

/// Print per-id outcomes; fail if any item failed.
fn report_batch<T: Serialize>(ids: &[u64], batch: &BatchResult<T>) -> Result<()> {
    let failures: Vec<_> = batch
        .failures
        .iter()
        .map(|(index, error)| {
            json!({
                "id": ids.get(*index),
                "kind": error.kind(),
                "error": error.to_string(),
            })
        })
        .collect();
    print_json(&json!({ "succeeded": batch.successes, "failed": failures }))?;

    if !batch.is_complete() {
        bail!("{} of {} operations failed", batch.failures.len(), ids.len());
    }
    Ok(())
}

async fn link_command(api: &AllDebrid, command: LinkCommand) -> Result<()> {
    let links = api.links();
    match command {
        LinkCommand::Info { links: urls, password } => {
            print_json(&links.info(urls, password.as_deref()).await?)
        }
        LinkCommand::Unlock { link, password } => {
            print_json(&links.unlock(&link, password.as_deref()).await?)
        }
    }
}
