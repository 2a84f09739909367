use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triage_advisor::{Advisor, AdvisorConfig, OpenAiClient};
use triage_core::{config::seed_source_from_env_value, CoreConfig, InMemoryRepository};

/// Main entry point for the referral triage service
///
/// Loads the seed registry, builds the completion client and serves the REST API
/// (including `POST /api/analyze` and Swagger UI) until Ctrl-C.
///
/// # Environment Variables
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `TRIAGE_SEED_FILE`: Seed registry YAML (default: the built-in registry)
/// - `OPENAI_API_KEY`: Completion API key; analysis fails with 500 while unset
/// - `TRIAGE_OPENAI_BASE_URL`, `TRIAGE_OPENAI_MODEL`, `TRIAGE_ADVISOR_TIMEOUT_SECS`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the seed registry cannot be read or parsed,
/// - the advisor configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_run=info".parse()?)
                .add_directive("triage_core=info".parse()?)
                .add_directive("triage_advisor=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("TRIAGE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(seed_source_from_env_value(
        std::env::var("TRIAGE_SEED_FILE").ok(),
    ));
    let patients = cfg.load_registry()?;
    tracing::info!("Loaded {} referrals from {:?}", patients.len(), cfg.seed());

    let advisor_cfg = AdvisorConfig::from_env_values(
        std::env::var("OPENAI_API_KEY").ok(),
        std::env::var("TRIAGE_OPENAI_BASE_URL").ok(),
        std::env::var("TRIAGE_OPENAI_MODEL").ok(),
        std::env::var("TRIAGE_ADVISOR_TIMEOUT_SECS").ok(),
    )?;
    if advisor_cfg.api_key().is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; analysis requests will fail");
    }
    let advisor = Advisor::new(Arc::new(OpenAiClient::new(advisor_cfg)?));

    let state = api_rest::AppState::new(Arc::new(InMemoryRepository::new(patients)), advisor);
    let app = api_rest::router(state);

    tracing::info!("++ Starting triage REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
