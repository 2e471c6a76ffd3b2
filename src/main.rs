use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use curio::assets::AssetStore;
use curio::config::{
    AuthConfig, DB_FILE_NAME, FileConfig, SECRET_FILE_NAME, ServerConfig, decode_secret,
    generate_secret,
};
use curio::server::{AppState, create_router};
use curio::store::{SqliteStore, Store};

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "A collection server for categories and image artefacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a data directory (database, asset folders, signing secret)
    Init {
        /// Data directory for the database and images
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for the database and images
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Public base URL for external access (e.g., "https://curio.example.com").
        /// Used for image URLs. If not set, URLs are derived from request headers.
        #[arg(long)]
        public_base_url: Option<String>,

        /// Base64 signing secret, overriding the one in the data directory
        #[arg(long, env = "CURIO_SIGNING_SECRET", hide_env_values = true)]
        signing_secret: Option<String>,
    },
}

async fn run_init(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let secret_file = data_dir.join(SECRET_FILE_NAME);
    if secret_file.exists() {
        bail!(
            "Data directory already initialized. Signing secret exists at: {}",
            secret_file.display()
        );
    }

    let store = SqliteStore::new(data_dir.join(DB_FILE_NAME))?;
    store.initialize()?;

    AssetStore::new(data_dir).ensure_dirs().await?;

    fs::write(&secret_file, generate_secret())?;

    #[cfg(unix)]
    set_restrictive_permissions(&secret_file);

    println!("Initialized data directory: {}", data_dir.display());
    println!("Signing secret written to: {}", secret_file.display());

    Ok(())
}

fn load_secret(data_dir: &Path, from_env: Option<String>) -> anyhow::Result<Vec<u8>> {
    let encoded = match from_env {
        Some(secret) => secret,
        None => {
            let secret_file = data_dir.join(SECRET_FILE_NAME);
            if !secret_file.exists() {
                bail!("Server not initialized. Run 'curio init' first to create the data directory.");
            }
            fs::read_to_string(&secret_file)
                .with_context(|| format!("Failed to read {}", secret_file.display()))?
        }
    };
    Ok(decode_secret(&encoded)?)
}

async fn run_serve(mut config: ServerConfig) -> anyhow::Result<()> {
    let db_path = config.db_path();
    if !db_path.exists() {
        bail!("Server not initialized. Run 'curio init' first to create the data directory.");
    }

    FileConfig::load(&config.data_dir)?.apply(&mut config)?;

    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    let state = Arc::new(AppState::new(Arc::new(store), &config));
    state.assets.ensure_dirs().await?;

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("curio=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => {
            run_init(&data_dir).await?;
        }
        Commands::Serve {
            host,
            port,
            data_dir,
            public_base_url,
            signing_secret,
        } => {
            let secret = load_secret(&data_dir, signing_secret)?;
            let mut config = ServerConfig::new(data_dir, AuthConfig::new(secret)?);
            config.host = host;
            config.port = port;
            config.public_base_url = public_base_url;

            run_serve(config).await?;
        }
    }

    Ok(())
}
