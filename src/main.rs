use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gemchat::connector::web::{self, PageConfig, ServeOptions};
use gemchat::{Commands, Container, ContainerConfig, DomainError, Router};

#[derive(Parser)]
#[command(name = "gemchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file holding GOOGLE_API_KEY, used when the environment has no key
    #[arg(long, global = true)]
    secrets_file: Option<PathBuf>,

    /// Gemini model name (defaults to $GEMINI_MODEL, then gemini-1.5-flash)
    #[arg(long, global = true)]
    model: Option<String>,

    /// API endpoint (defaults to $GEMINI_BASE_URL, then the public Gemini API)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds for each completion
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Answer with an offline echo instead of calling the API
    #[arg(long, global = true)]
    mock_gateway: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ContainerConfig {
        mock_gateway: cli.mock_gateway,
        secrets_file: cli.secrets_file,
        model: cli.model,
        base_url: cli.base_url,
        request_timeout: cli.timeout.map(Duration::from_secs),
    };

    // Without a usable credential nothing else may start.
    let container = match Container::new(config) {
        Ok(container) => container,
        Err(DomainError::Configuration(e)) => {
            eprintln!("⚠️ {e}");
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    match cli.command {
        Commands::Serve {
            port,
            public,
            title,
            session_ttl,
        } => {
            let host = if public { [0, 0, 0, 0] } else { [127, 0, 0, 1] };
            let options = ServeOptions {
                addr: SocketAddr::from((host, port)),
                page: PageConfig {
                    title,
                    ..PageConfig::default()
                },
                session_ttl: Duration::from_secs(session_ttl),
            };
            info!("Serving chat with {}", container.gateway_name());
            web::serve(Arc::new(container), options).await?;
        }
        command => {
            let router = Router::new(&container);
            let output = router.route(command).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
