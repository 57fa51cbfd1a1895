use gamepack::prelude::*;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Config
    let database_url = env::var("DATABASE_URL")?;
    let cloudinary = CloudinaryConfig::from_env()?;
    let config = BuildConfig::default();

    // Providers
    let store = PgGameStore::connect(&database_url).await?;
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let uploader = CloudinaryUploader::new(cloudinary)?;

    // Build
    let app = GamepackServer::new(GamepackServerConfig { build: config })
        .build(store, fetcher, uploader);

    // Serve
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    println!("Server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
