use gamepack_build::BuildPipeline;
use gamepack_core::traits::{GameStore, ImageFetcher, SheetUploader};

#[derive(Clone)]
pub struct AppState<G: GameStore, F: ImageFetcher, U: SheetUploader> {
    pub pipeline: BuildPipeline<G, F, U>,
}
