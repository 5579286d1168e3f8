use std::env;
use std::error::Error;

use eligibility_engine::api::{AppState, create_router};
use eligibility_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_LOG_LEVEL: &str = "info";

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    init_tracing()?;

    let config_dir =
        env::var("ELIGIBILITY_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        required_months = config.policy().required_months,
        cross_tier_absorption = config.policy().cross_tier_absorption,
        "Configuration loaded"
    );

    let bind_addr =
        env::var("ELIGIBILITY_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Eligibility engine listening");

    axum::serve(listener, create_router(AppState::new(config))).await?;
    Ok(())
}

/// `RUST_LOG` wins over `ELIGIBILITY_LOG_LEVEL`.
fn init_tracing() -> Result<(), BoxError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level =
                env::var("ELIGIBILITY_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
            EnvFilter::try_new(level)?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
}
