use std::{error::Error, sync::Arc};

use checkout_gateway::{config::Config, create_routes, processor::PayPalClient, AppState};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkout_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config =
        Config::from_env().inspect_err(|err| tracing::error!(%err, "invalid configuration"))?;
    tracing::info!(
        mode = ?config.processor.mode,
        api_base = %config.processor.api_base,
        "payment processor configured"
    );
    if config.webhook_secret.is_none() {
        tracing::warn!("PAYPAL_WEBHOOK_SECRET not set, webhook signatures are not checked");
    }

    let processor = PayPalClient::new(&config.processor)?;

    let app_state = AppState {
        processor: Arc::new(processor),
        checkout: Arc::new(config.checkout),
    };

    let app = create_routes(app_state, config.webhook_secret);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::debug!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
