//! Start the catalog server.

use clap::Args;

use catalog_core::config::DatabaseProvider;
use catalog_core::error::AppError;
use catalog_database::Store;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Use the in-memory store regardless of configuration
    #[arg(long)]
    pub memory: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.memory {
        config.database.provider = DatabaseProvider::Memory;
    }
    config.validate()?;

    println!("Starting catalog server...");
    println!("  Address: {}", config.server.bind_address());
    println!("  Store:   {}", config.database.provider);

    let store = Store::connect(&config.database).await?;
    catalog_api::run_server(config, store).await
}
