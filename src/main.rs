use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yaolist_s3::config;
use yaolist_s3::storage::{DriverBox, StorageManager};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("YAOLIST_S3_BUILD_TIME"),
    ")"
);

/// Browse and copy objects of mounted S3 storages.
#[derive(Parser, Debug)]
#[command(name = "yaolist-s3")]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    /// Config file, defaults to ./config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List a directory
    List {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Server side copy of one key
    Copy {
        src: String,
        dst: String,
        /// Treat both paths as directories
        #[arg(long)]
        dir: bool,
    },
    /// Presigned download link
    Link { path: String },
    /// Show driver types and mounts
    Drivers,
}

/// Mount every configured storage / 挂载所有存储
async fn mount_storages(manager: &StorageManager, app_config: &config::AppConfig) {
    for storage in app_config.ordered_storages() {
        if let Err(e) = manager
            .create_driver(&storage.mount_path, &storage.driver, storage.config.clone())
            .await
        {
            tracing::error!("Failed to mount {}: {}", storage.mount_path, e);
        }
    }
}

async fn resolve(manager: &StorageManager, path: &str) -> Result<(DriverBox, String)> {
    manager
        .resolve_path(path)
        .await
        .ok_or_else(|| anyhow!("No storage mounted for {}", path))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yaolist_s3=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let app_config = config::load_config(&config_path).map_err(|e| anyhow!(e))?;

    let manager = StorageManager::new();
    yaolist_s3::register_storage_drivers(&manager).await?;
    mount_storages(&manager, &app_config).await;

    match cli.command {
        Commands::List { path } => {
            let (driver, rel) = resolve(&manager, &path).await?;
            let entries = driver.list(&rel).await?;
            print_json(&entries)?;
        }
        Commands::Copy { src, dst, dir } => {
            let (src_driver, src_rel) = resolve(&manager, &src).await?;
            let (dst_driver, dst_rel) = resolve(&manager, &dst).await?;
            if !Arc::ptr_eq(&src_driver, &dst_driver) {
                bail!("Copy across storages is not supported: {} -> {}", src, dst);
            }
            src_driver.copy_item(&src_rel, &dst_rel, dir).await?;
            tracing::info!("Copied {} -> {}", src, dst);
        }
        Commands::Link { path } => {
            let (driver, rel) = resolve(&manager, &path).await?;
            match driver.get_direct_link(&rel).await? {
                Some(url) => println!("{}", url),
                None => bail!("{} does not provide direct links", driver.name()),
            }
        }
        Commands::Drivers => {
            let types: Vec<_> = manager
                .list_driver_infos()
                .await
                .into_iter()
                .map(|(driver_type, info)| serde_json::json!({ "type": driver_type, "info": info }))
                .collect();
            let mut mounts = Vec::new();
            for mount in manager.list_drivers().await {
                let error = manager.get_driver_error(&mount).await;
                mounts.push(serde_json::json!({ "mount_path": mount, "error": error }));
            }
            print_json(&serde_json::json!({ "types": types, "mounts": mounts }))?;
        }
    }
    Ok(())
}
