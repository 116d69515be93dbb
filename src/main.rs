use log::{error, info};

use chat_service::integration;
use chat_service::state::AppState;

#[tokio::main]
async fn main() {
    let config = integration::Config::default();

    let state = match AppState::init(&config) {
        Ok(state) => state,
        Err(e) => panic!("Failed to initialize state: {e}"),
    };

    let app = chat_service::app(state, &config.env);

    let addr = config.env.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => panic!("Failed to bind {addr}: {e}"),
    };

    info!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server stopped: {e}");
    }
}
