use clap::Parser;
use huntcamp_server::{App, ServerConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "huntcamp-server", about = "Hunting camp coordination dashboard server")]
struct Cli {
    /// TOML configuration file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding stands, hunters and activity data.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory of static dashboard files.
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Number of request worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Base URL of the weather upstream.
    #[arg(long)]
    weather_url: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, huntcamp_server::ServerError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(public_dir) = self.public_dir {
            config.public_dir = public_dir;
        }
        if let Some(workers) = self.workers {
            config.workers = workers.max(1);
        }
        if let Some(url) = self.weather_url {
            config.weather.base_url = url.trim_end_matches('/').to_owned();
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), huntcamp_server::ServerError> {
    let config = cli.into_config()?;
    let addr = config.addr();
    info!("starting huntcamp-server on {addr}");
    info!("data directory: {}", config.data_dir.display());
    info!("public directory: {}", config.public_dir.display());

    let app = Arc::new(App::from_config(&config)?);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let _ = ctrlc::set_handler(move || {
        if flag.load(Ordering::SeqCst) {
            std::process::exit(1);
        }
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nshutdown requested, finishing current requests...");
    });

    huntcamp_server::run_server(&app, &addr, config.workers, &shutdown)
}
