use rocket::{launch, routes};
use std::sync::Arc;

use simpleswap_core::{bootstrap, config};
use simpleswap_core::web::routes::{health, pools, positions, quote, tokens};

#[launch]
async fn rocket() -> _ {
    env_logger::init();

    // Load configuration
    let config = config::Config::from_env()
        .expect("Failed to load configuration");

    // Build application state
    let app_state = Arc::new(
        bootstrap::AppState::new(&config)
            .expect("Failed to initialize application state")
    );

    if let Err(e) = app_state.session.pools.refresh().await {
        log::warn!("Initial pool load failed: {}", e);
    }

    // Configure Rocket
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(app_state)
        .mount("/", routes![health, pools, tokens, positions, quote])
}
