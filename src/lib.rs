// Library root: everything main.rs, the create_user binary and the tests share.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;
pub mod websocket;

pub use config::Config;
pub use routes::router;

use std::sync::Arc;
use storage::Stores;
use websocket::Hub;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
    pub hub: Arc<Hub>,
}

impl AppState {
    /// Wires the broadcast hub to the same catalog and chat stores the HTTP edge uses.
    pub fn new(config: Arc<Config>, stores: Stores) -> Self {
        let hub = Arc::new(Hub::new(
            stores.catalog.clone(),
            stores.chat.clone(),
            config.chat_identity,
        ));
        Self { config, stores, hub }
    }
}
