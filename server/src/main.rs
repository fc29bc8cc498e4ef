mod settings;
mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use soilscope_api::server::{
    ANALYSES_TOTAL, MODEL_UNAVAILABLE_TOTAL, REQUESTS_TOTAL, VALIDATION_ERRORS_TOTAL,
};
use soilscope_api::{start_server, AppState, CorsPolicy, SoilAnalyzer};
use soilscope_model::ModelState;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::settings::{AppConfig, LogFormat};
use crate::version::{git_commit_hash, SOILSCOPE_VERSION};

fn cli() -> Command {
    Command::new("soilscope-server")
        .version(SOILSCOPE_VERSION)
        .about("SoilScope irrigation and fertility analysis API")
        .disable_version_flag(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Override bind host"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .help("Override bind port"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Override the model artifact path"),
        )
        .arg(
            Arg::new("version_flag")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information and exit"),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    if matches.get_flag("version_flag") {
        println!("SoilScope {} (commit {})", SOILSCOPE_VERSION, git_commit_hash());
        return Ok(());
    }

    let config_path = matches.get_one::<String>("config").map(Path::new);
    let mut config = AppConfig::load(config_path)?;
    apply_overrides(&matches, &mut config);
    config.validate()?;

    init_logging(&config)?;
    info!(
        "Starting SoilScope API {} (commit {})",
        SOILSCOPE_VERSION,
        git_commit_hash()
    );
    match &config.config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found; using defaults and environment"),
    }

    let prometheus = init_metrics(&config);

    // Loaded once, before the listener binds.
    let model_state = ModelState::load(&config.model_path);
    if !model_state.is_loaded() {
        warn!(
            "Serving without a model from {}; analysis requests will report an error",
            config.model_path.display()
        );
    }

    let cors = CorsPolicy::from_origins(&config.allowed_origins);
    if cors == CorsPolicy::Permissive {
        warn!("CORS allows every origin; set allowed_origins to restrict it");
    }

    let state = AppState::new(SoilAnalyzer::new(model_state))
        .with_metrics(prometheus)
        .with_cors(cors);

    let addr = config.bind_addr();
    tokio::select! {
        result = start_server(state, &addr) => result.context("SoilScope API failed")?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    Ok(())
}

fn apply_overrides(matches: &clap::ArgMatches, config: &mut AppConfig) {
    if let Some(host) = matches.get_one::<String>("host") {
        config.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(model) = matches.get_one::<String>("model") {
        config.model_path = PathBuf::from(model);
    }
}

fn init_metrics(config: &AppConfig) -> Option<PrometheusHandle> {
    if !config.prometheus_enabled {
        info!("Prometheus metrics exporter disabled via configuration");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics exporter registered");
            describe_counter!(REQUESTS_TOTAL, "Total number of HTTP requests handled");
            describe_counter!(ANALYSES_TOTAL, "Samples analyzed successfully");
            describe_counter!(
                MODEL_UNAVAILABLE_TOTAL,
                "Analysis requests answered without a loaded model"
            );
            describe_counter!(
                VALIDATION_ERRORS_TOTAL,
                "Request bodies rejected before analysis"
            );
            Some(handle)
        }
        Err(err) => {
            warn!("Failed to install Prometheus metrics exporter: {}", err);
            None
        }
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = match config.log_format {
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    result.context("Failed to initialise logging")
}
