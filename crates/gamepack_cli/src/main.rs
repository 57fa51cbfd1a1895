use gamepack_client::GamepackClient;
use gamepack_core::prelude::*;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gamepack")]
#[command(about = "CLI for the Gamepack build server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL
    #[arg(short, long, env = "GAMEPACK_URL", default_value = "http://localhost:3000")]
    url: String,
}

/// Selects a game by id or by code. The id wins when both are given.
#[derive(Args)]
struct GameArgs {
    #[arg(long)]
    id: Option<String>,

    #[arg(long)]
    code: Option<String>,
}

impl GameArgs {
    fn game_ref(&self) -> Result<GameRef, BuildError> {
        GameRef::from_parts(self.id.as_deref(), self.code.as_deref())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the asset pack manifest
    Pack {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Build and publish the sprite sheet, then print its manifest
    Sprite {
        #[command(flatten)]
        game: GameArgs,
    },
    /// Download the zip bundle
    Bundle {
        #[command(flatten)]
        game: GameArgs,

        /// Output file or directory (defaults to the server's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all games
    Games,
    /// Print the plain game export
    Export {
        #[command(flatten)]
        game: GameArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = GamepackClient::new(cli.url.clone());

    match cli.command {
        Commands::Pack { game } => {
            let pack = client.fetch_pack(&game.game_ref()?).await?;
            println!("{}", serde_json::to_string_pretty(&pack)?);
        }
        Commands::Sprite { game } => {
            let game = game.game_ref()?;
            eprintln!("🧩 Building sprite sheet for {game}...");
            let sprite = client.fetch_sprite(&game).await?;
            println!("{}", serde_json::to_string_pretty(&sprite)?);
        }
        Commands::Bundle { game, output } => {
            let game = game.game_ref()?;
            eprintln!("📦 Building bundle for {game}...");

            let bundle = client.download_bundle(&game).await?;
            let file_name = bundle
                .file_name
                .unwrap_or_else(|| "game_pack.zip".to_string());
            let output = match output {
                Some(path) if path.is_dir() => path.join(&file_name),
                Some(path) => path,
                None => PathBuf::from(&file_name),
            };

            if let Some(parent) = output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&output, &bundle.data).await?;

            eprintln!("✅ Saved {} bytes to {output:?}", bundle.data.len());
        }
        Commands::Games => {
            for game in client.list_games().await? {
                println!("{}\t{}\t{}", game.id, game.code, game.name);
            }
        }
        Commands::Export { game } => {
            let export = client.export(&game.game_ref()?).await?;
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
    }

    Ok(())
}
