use gamepack::prelude::*;
use std::env;
use std::path::PathBuf;
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let data = PathBuf::from(env::var("GAMEPACK_DATA").unwrap_or_else(|_| "./gamepack_data".into()));
    let public_url = env::var("GAMEPACK_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://localhost:{port}/sprites"));

    // Providers
    let config = BuildConfig::default();
    let store = FsGameStore::new(&data);
    let sheets = FsSheetStore::new(data.join("sprites"), public_url);
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;

    // Build App
    let app = GamepackServer::new(GamepackServerConfig { build: config })
        .build(store, fetcher, sheets.clone())
        .nest_service("/sprites", ServeDir::new(sheets.root()));

    // Serve
    let addr = format!("0.0.0.0:{port}");
    println!("Server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
