use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use folio::cache::MemoryCache;
use folio::cli::{
    AdminCommands, OrgCommands, SpaceCommands, UserCommands, run_init, run_org_create,
    run_space_add_member, run_space_create, run_user_create,
};
use folio::config::AppConfig;
use folio::events::BroadcastPublisher;
use folio::server::{AppState, create_router};
use folio::store::SqliteStore;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "A workspace and page server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database (overrides the config file)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db_path = config.storage.db_path();
    if !db_path.exists() {
        bail!("Server not initialized. Run 'folio admin init' first to create the database.");
    }

    let store = SqliteStore::new(&db_path)?;
    let events = BroadcastPublisher::new(config.events.capacity);
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(events),
        Arc::new(MemoryCache::new()),
        &config,
    ));

    let app = create_router(state);
    let addr = config.server.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("folio=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init { data_dir } => run_init(data_dir)?,
            AdminCommands::User { command } => match command {
                UserCommands::Create {
                    data_dir,
                    email,
                    name,
                } => run_user_create(data_dir, email, name)?,
            },
            AdminCommands::Org { command } => match command {
                OrgCommands::Create {
                    data_dir,
                    name,
                    slug,
                    owner,
                } => run_org_create(data_dir, name, slug, owner)?,
            },
            AdminCommands::Space { command } => match command {
                SpaceCommands::Create {
                    data_dir,
                    org_id,
                    name,
                    slug,
                    owner,
                } => run_space_create(data_dir, org_id, name, slug, owner)?,
                SpaceCommands::AddMember {
                    data_dir,
                    space_id,
                    email,
                    role,
                } => run_space_add_member(data_dir, space_id, email, role)?,
            },
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let mut config = AppConfig::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.storage.data_dir = data_dir;
            }
            serve(config).await?;
        }
    }

    Ok(())
}
