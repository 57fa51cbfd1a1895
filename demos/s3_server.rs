use aws_config::BehaviorVersion;
use gamepack::prelude::*;
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Config
    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    let database_url = env::var("DATABASE_URL")?;
    let bucket_name = env::var("GAMEPACK_BUCKET")?;
    let public_url = env::var("GAMEPACK_PUBLIC_URL")
        .unwrap_or_else(|_| format!("https://{bucket_name}.s3.amazonaws.com"));
    let config = BuildConfig::default();

    // Providers
    let store = PgGameStore::connect(&database_url).await?;
    let fetcher = HttpFetcher::new(config.fetch_timeout)?;
    let sheets = S3SheetStore::new(
        s3_client,
        bucket_name,
        Some("sprites/".to_string()),
        public_url,
    );

    // Build
    let app = GamepackServer::new(GamepackServerConfig { build: config })
        .build(store, fetcher, sheets);

    // Serve
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    println!("Server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
