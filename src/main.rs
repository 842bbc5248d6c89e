use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aura_studio_server::ai::{GeminiProvider, GenerativeModel};
use aura_studio_server::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_METRICS_PORT, DEFAULT_PORT,
};
use aura_studio_server::metrics;
use aura_studio_server::{run_server, QuotaGate, RequestsLoggingLevel, Studio};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Gemini API key.
    #[clap(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    #[clap(long)]
    pub api_base_url: Option<String>,

    /// Model used for text and JSON features.
    #[clap(long)]
    pub model: Option<String>,

    /// Model used for speech synthesis.
    #[clap(long)]
    pub speech_model: Option<String>,

    /// Model announced in live tutor setup messages.
    #[clap(long)]
    pub live_model: Option<String>,

    /// Prebuilt voice for speech synthesis.
    #[clap(long)]
    pub voice: Option<String>,

    /// Timeout in seconds for model requests. 0 disables it.
    #[clap(long, default_value_t = 0)]
    pub request_timeout_sec: u64,

    /// Text file replacing the built-in site search index.
    #[clap(long, value_parser = parse_path)]
    pub search_index_path: Option<PathBuf>,

    /// Language used when a request does not name one (en, fa, ar).
    #[clap(long)]
    pub default_language: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level,
            frontend_dir_path: self.frontend_dir_path.clone(),
            default_language: self.default_language.clone(),
            search_index_path: self.search_index_path.clone(),
            api_key: self.api_key.clone(),
            api_base_url: self.api_base_url.clone(),
            model: self.model.clone(),
            speech_model: self.speech_model.clone(),
            live_model: self.live_model.clone(),
            voice: self.voice.clone(),
            request_timeout_sec: self.request_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let provider = GeminiProvider::new(app_config.gemini_settings());
    info!(
        "Using {} model {} (speech: {})",
        provider.name(),
        provider.model(),
        app_config.gemini.speech_model
    );
    let model: Arc<dyn GenerativeModel> = Arc::new(provider);
    let studio = Studio::new(model, QuotaGate::new(), app_config.studio_settings()?);

    run_server(app_config.http, Arc::new(studio)).await
}
