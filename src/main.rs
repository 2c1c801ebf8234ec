use anyhow::{Context, Result};
use azrest::arm::client::ArmClient;
use azrest::arm::http::{format_arm_error, Transport};
use azrest::arm::resource_groups::ResourceGroupService;
use azrest::resource::{self, ArmCollection, Resource, ResourceFilter, ResourceService};
use azrest::Configuration;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via AZREST_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZREST_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// CRUD for Azure Resource Manager resources
#[derive(Parser, Debug)]
#[command(name = "azrest", version, about, long_about = None)]
struct Args {
    /// Subscription to use
    #[arg(short, long)]
    subscription: Option<String>,

    /// Default resource group
    #[arg(short = 'g', long)]
    resource_group: Option<String>,

    /// Maximum concurrent calls when listing across resource groups
    #[arg(long)]
    max_threads: Option<usize>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Run in read-only mode (block all write operations)
    #[arg(long)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known service keys
    Services,
    /// List resource groups in the subscription
    Groups,
    /// List resources of a service
    List {
        service: String,
        /// List across the whole subscription instead of one group
        #[arg(long)]
        all: bool,
        /// Keep only resources where FIELD equals VALUE (repeatable)
        #[arg(long = "filter", value_name = "FIELD=VALUE")]
        filters: Vec<String>,
    },
    /// Show one resource
    Show { service: String, name: String },
    /// Create or update a resource from a JSON body
    Put {
        service: String,
        name: String,
        /// Path to a JSON file with the request body
        #[arg(long)]
        body: PathBuf,
    },
    /// Delete a resource
    Delete { service: String, name: String },
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

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azrest {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azrest").join("azrest.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azrest").join("azrest.log");
    }
    PathBuf::from("azrest.log")
}

/// Config file, then environment, then flags
fn effective_config(args: &Args) -> Configuration {
    let mut config = Configuration::load();
    if let Some(subscription) = &args.subscription {
        config.subscription_id = Some(subscription.clone());
    }
    if let Some(group) = &args.resource_group {
        config.resource_group = Some(group.clone());
    }
    if let Some(threads) = args.max_threads {
        config.max_threads = threads;
    }
    config
}

fn print<T: Serialize + ?Sized>(format: OutputFormat, value: &T) -> Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn raw_items(collection: &ArmCollection<Resource>) -> Vec<&Value> {
    collection.iter().map(|r| r.raw()).collect()
}

fn service_for(
    key: &str,
    config: &Arc<Configuration>,
    transport: &Arc<dyn Transport>,
) -> Result<ResourceService> {
    let def = resource::get_service(key).with_context(|| {
        format!(
            "Unknown service '{}'. Known services: {}",
            key,
            resource::get_all_service_keys().join(", ")
        )
    })?;
    Ok(ResourceService::new(config.clone(), transport.clone(), def.clone()))
}

async fn run(args: Args) -> Result<()> {
    if matches!(args.command, Command::Services) {
        for key in resource::get_all_service_keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    let config = effective_config(&args);
    config.validate()?;
    tracing::info!(
        "Using subscription: {}, resource group: {:?}",
        config.subscription_id.as_deref().unwrap_or("-"),
        config.resource_group
    );

    let transport: Arc<dyn Transport> = Arc::new(ArmClient::from_config(&config)?);
    let config = Arc::new(config);

    match &args.command {
        Command::Services => {},
        Command::Groups => {
            let groups = ResourceGroupService::new(config.clone(), transport.clone())
                .list()
                .await?;
            let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
            print(args.output, &names)?;
        },
        Command::List {
            service,
            all,
            filters,
        } => {
            let svc = service_for(service, &config, &transport)?;
            let filters = filters
                .iter()
                .map(|expr| {
                    ResourceFilter::parse(expr)
                        .with_context(|| format!("Invalid filter '{}', expected FIELD=VALUE", expr))
                })
                .collect::<Result<Vec<_>>>()?;

            let collection = if !*all {
                let mut page = svc.list(None, None).await?;
                page.retain(|r| resource::filter::matches_all(r, &filters));
                page
            } else if svc.service_def().list_all {
                svc.list_all(&filters, None).await?
            } else {
                let mut merged = svc.list_in_all_groups(None).await?;
                merged.retain(|r| resource::filter::matches_all(r, &filters));
                merged
            };

            print(args.output, &raw_items(&collection))?;
        },
        Command::Show { service, name } => {
            let svc = service_for(service, &config, &transport)?;
            let model = svc.get(name, None, None).await?;
            print(args.output, model.raw())?;
        },
        Command::Put {
            service,
            name,
            body,
        } => {
            if args.readonly {
                anyhow::bail!("Write operations are disabled in read-only mode");
            }
            let svc = service_for(service, &config, &transport)?;
            let content = std::fs::read_to_string(body)
                .with_context(|| format!("Failed to read {:?}", body))?;
            let options: Value =
                serde_json::from_str(&content).context("Request body is not valid JSON")?;

            let created = svc.create(name, None, &options, None).await?;
            let accepted = serde_json::json!({
                "status": created.headers.status(),
                "tracking_url": created.tracking_url(),
            });
            match created.into_resource() {
                Some(model) => print(args.output, model.raw())?,
                None => print(args.output, &accepted)?,
            }
        },
        Command::Delete { service, name } => {
            if args.readonly {
                anyhow::bail!("Write operations are disabled in read-only mode");
            }
            let svc = service_for(service, &config, &transport)?;
            let headers = svc.delete(name, None, None).await?;
            print(
                args.output,
                &serde_json::json!({
                    "status": headers.status(),
                    "request_id": headers.request_id(),
                    "correlation_request_id": headers.correlation_request_id(),
                    "tracking_url": headers.tracking_url(),
                }),
            )?;
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        tracing::error!("{:?}", err);
        eprintln!("Error: {}", format_arm_error(&err));
        std::process::exit(1);
    }
}
