//! # Gamepack Build
//!
//! The build pipeline behind the pack, sprite and bundle operations.
//!
//! * [`resolve`] derives transformed CDN URLs for stored assets.
//! * [`pack`] turns a game and its assets into a pack manifest.
//! * [`layout`] plans a uniform sprite grid.
//! * [`compose`] fetches tiles concurrently and draws the sheet.
//! * [`publish`] uploads the sheet under a per-game id.
//! * [`bundle`] writes the zip archive.
//!
//! [`BuildPipeline`] ties them together over a [`GameStore`], an
//! [`ImageFetcher`] and a [`SheetUploader`].
//!
//! [`GameStore`]: gamepack_core::traits::GameStore
//! [`ImageFetcher`]: gamepack_core::traits::ImageFetcher
//! [`SheetUploader`]: gamepack_core::traits::SheetUploader

pub mod bundle;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod layout;
pub mod pack;
pub mod pipeline;
pub mod publish;
pub mod resolve;

pub use pipeline::BuildPipeline;

pub mod prelude {
    pub use crate::bundle::Bundle;
    pub use crate::compose::{ComposedSprite, SpriteComposer};
    pub use crate::config::BuildConfig;
    pub use crate::fetch::HttpFetcher;
    pub use crate::layout::{Tile, plan_layout};
    pub use crate::pack::PackAssembler;
    pub use crate::pipeline::BuildPipeline;
    pub use crate::publish::SpriteSheetPublisher;
    pub use crate::resolve::UrlResolver;
}
