//! # Gamepack Server
//!
//! An [axum] router around the [`BuildPipeline`](gamepack_build::BuildPipeline):
//!
//! | route | response |
//! |---|---|
//! | `GET /build/pack?id=\|code=` | pack manifest JSON |
//! | `GET /build/sprite?id=\|code=` | sprite manifest JSON |
//! | `GET /build/bundle?id=\|code=` | `game_pack_<code>.zip` |
//! | `GET /export?id=\|code=` | export-config JSON |
//! | `GET /games` | all games, newest first |
//! | `GET /games/{id}` | one game with its assets |

mod api;
mod server;

pub mod state;

pub use server::{GamepackServer, GamepackServerConfig};

pub mod prelude {
    pub use crate::server::{GamepackServer, GamepackServerConfig};
    pub use crate::state::*;
}
