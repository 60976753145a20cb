use lepen_gateway::{server, AppConfig};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            log::warn!("Failed to read .env file: {}", e);
        }
    }

    let config = AppConfig::from_env();
    if let Err(e) = server::start(config).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
