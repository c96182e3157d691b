use anyhow::Result;

mod config;
mod render;
mod workflows;

use config::SuiteConfig;
use workflows::CapabilityRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let config = SuiteConfig::from_env()?;
    let registry = CapabilityRegistry::with_builtin();

    tracing::info!(
        "Portfolio suite starting: workflow={}, available={:?}",
        config.workflow,
        registry.available()
    );

    if !registry.is_available(config.workflow) {
        tracing::warn!("{} requested but not registered", config.workflow);
        println!(
            "{} is still in development and not available in this build.",
            config.workflow
        );
        return Ok(());
    }

    registry.dispatch(config.workflow, &config).await
}
