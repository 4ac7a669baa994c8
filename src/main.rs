use dotenv::dotenv;
use realtor_backend::app::app::App;
use realtor_backend::util::logger::Logger;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Console + rolling file logging; guards keep the writers alive
    let _logger = Logger::new().expect("Failed to initialize logging");

    info!("Starting Realtor Backend Application");

    // Load environment variables from .env file
    match dotenv() {
        Ok(_) => info!("Successfully loaded .env file"),
        Err(e) => warn!("Failed to load .env file: {} (using system env vars)", e),
    }

    // Create and start the App
    let app = App::new().await;
    app.start().await;
}
