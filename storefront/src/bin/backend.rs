use std::sync::Arc;

use anyhow::Context;
use commerce::api::AppState;
use commerce::auth::AccessPolicy;
use commerce::executable_utils::{initialize_executable, initialize_tracing, run_backend};
use commerce::payment::PaystackClient;
use commerce::pricing::PricingPolicy;
use storefront::storefront_storage::ProdStorefrontStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("Starting storefront backend...");
    let config = initialize_executable().map_err(|e| anyhow::anyhow!(e))?;
    initialize_tracing(&config.backend.log_level);

    let storage = ProdStorefrontStorage::new(&config.common.database_url)
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("connecting to the storefront database")?;
    if config.common.apply_schema {
        storage.apply_schema().await.map_err(|e| anyhow::anyhow!(e))?;
    }

    let payments = Arc::new(PaystackClient::new(&config.payment).map_err(|e| anyhow::anyhow!(e))?);
    let access = AccessPolicy::from_config(&config.auth).map_err(|e| anyhow::anyhow!(e))?;
    let state = AppState::new(
        Arc::new(storage),
        payments,
        PricingPolicy::from(&config.pricing),
        config.payment.callback_url.clone(),
        access,
    );

    run_backend(config.backend, state).await.map_err(|e| anyhow::anyhow!(e))
}
