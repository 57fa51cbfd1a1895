//! # Simple Client Example
//!
//! Fetches the pack and sprite manifests for a game, then downloads its bundle.
//!
//! ## Usage
//!
//! ```sh
//! cargo run --example fs_server --features "server fs"
//! cargo run --example simple_client --features "client" -- lucky_sevens
//! ```

use gamepack::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = std::env::args().nth(1).unwrap_or_else(|| "lucky_sevens".to_string());
    let game = GameRef::Code(code);

    let client = GamepackClient::new("http://localhost:3000");

    let pack = client.fetch_pack(&game).await?;
    println!("{} has {} assets", pack.name, pack.assets.len());

    let sprite = client.fetch_sprite(&game).await?;
    println!(
        "Sprite sheet {}x{} published at {}",
        sprite.sprite.width, sprite.sprite.height, sprite.sprite.url
    );
    for (label, frame) in &sprite.frames {
        println!("  {label}: {}x{} at ({}, {})", frame.w, frame.h, frame.x, frame.y);
    }

    let bundle = client.download_bundle(&game).await?;
    let file_name = bundle.file_name.unwrap_or_else(|| "game_pack.zip".to_string());
    tokio::fs::write(&file_name, &bundle.data).await?;

    println!("Bundle downloaded to {file_name}!");

    Ok(())
}
