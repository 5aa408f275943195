use rocket::{launch, routes};
use std::sync::Arc;

mod bootstrap;
mod chain;
mod config;
mod engine;
mod error;
mod math;
mod models;
mod web;

use crate::web::routes::{health, orderbook};

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

    // Background polling; the first pass runs right away
    tokio::spawn(app_state.service.clone().run(app_state.refresh_interval));

    // Configure Rocket
    let figment = rocket::Config::figment()
        .merge(("port", config.port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .manage(app_state)
        .mount("/", routes![orderbook, health])
}
