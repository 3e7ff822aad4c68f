use std::env;

mod api;

use api::config::AppConfig;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = env::var("API_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let config = AppConfig::from_env();
    api::server::run(config, port).await;
}
