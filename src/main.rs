/// Version injected at compile time via VULTR_CLIENT_VERSION (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("VULTR_CLIENT_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use vultr_client::api::client::API_URL;
use vultr_client::api::http::format_vultr_error;
use vultr_client::config::Config;
use vultr_client::resources::account::Account;
use vultr_client::resources::registry::{self, FamilyDef};
use vultr_client::{VultrClient, VultrError};

/// Command line client for the Vultr v2 API
#[derive(Parser, Debug)]
#[command(name = "vultr", version = VERSION, about, long_about = None)]
struct Args {
    /// API token (falls back to VULTR_API_KEY, then the config file)
    #[arg(long)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// API root
    #[arg(long, default_value = API_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print account information
    Account,
    /// Print the raw list response of a family
    List { family: String },
    /// Print the identifiers of a family, one per line
    Ids { family: String },
    /// Print one cached record of a family
    Get { family: String, id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_path: &Path,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_level.into())
                .from_env_lossy(),
        )
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vultr {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn family(name: &str) -> Result<&'static FamilyDef> {
    registry::get_family(name).with_context(|| {
        format!(
            "Unknown family '{}'. Known families: {}",
            name,
            registry::all_family_names().join(", ")
        )
    })
}

/// Attach the user-facing message for `err` on top of the library error
fn friendly(err: VultrError) -> anyhow::Error {
    let message = format_vultr_error(&err);
    anyhow::Error::new(err).context(message)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_error) = match Config::try_load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let level = match args.log_level {
        Some(level) => level,
        None => config
            .log_level
            .as_deref()
            .and_then(|s| LogLevel::from_str(s, true).ok())
            .unwrap_or(LogLevel::Off),
    };
    let _log_guard = setup_logging(level, &config.log_path())?;

    if let Some(e) = config_error {
        eprintln!("Warning: ignoring config file: {e:#}");
        tracing::warn!("Ignoring config file: {:#}", e);
    }

    let Some(token) = config.effective_token(args.token.as_deref()) else {
        bail!("No API token. Pass --token, set VULTR_API_KEY or add api_token to the config file");
    };

    let client = VultrClient::with_base_url(&token, &args.api_url)
        .map_err(friendly)
        .context("Failed to build the API client")?;

    match args.command {
        Command::Account => {
            let body = Account::new(client)
                .info()
                .await
                .map_err(friendly)
                .context("Failed to fetch account info")?;
            println!("{body}");
        }
        Command::List { family: name } => {
            let def = family(&name)?;
            let body = client
                .get(def.path)
                .await
                .map_err(friendly)
                .with_context(|| format!("Failed to list {name}"))?;
            println!("{body}");
        }
        Command::Ids { family: name } => {
            let records = family(&name)?
                .load_records(&client)
                .await
                .map_err(friendly)
                .with_context(|| format!("Failed to load {name}"))?;
            for (id, _) in records {
                println!("{id}");
            }
        }
        Command::Get { family: name, id } => {
            let records = family(&name)?
                .load_records(&client)
                .await
                .map_err(friendly)
                .with_context(|| format!("Failed to load {name}"))?;
            let Some((_, record)) = records.into_iter().find(|(key, _)| *key == id) else {
                bail!("No {name} record with id '{id}'");
            };
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }

    Ok(())
}
