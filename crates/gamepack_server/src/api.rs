use crate::state::AppState;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use gamepack_core::prelude::*;
use tracing::{error, warn};

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self
            .0
            .downcast_ref::<BuildError>()
            .map(|build_err| (status_for(build_err), build_err.kind()))
            .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, "internal"));

        if status.is_server_error() {
            error!("{kind}: {:#}", self.0);
        } else {
            warn!("{kind}: {}", self.0);
        }

        (
            status,
            Json(serde_json::json!({
                "error": kind,
                "details": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

fn status_for(err: &BuildError) -> StatusCode {
    match err {
        BuildError::MissingReference | BuildError::NoImageAssets(_) => StatusCode::BAD_REQUEST,
        BuildError::GameNotFound(_) => StatusCode::NOT_FOUND,
        BuildError::DataIntegrity { .. }
        | BuildError::DuplicateLabel { .. }
        | BuildError::SheetTooLarge { .. }
        | BuildError::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BuildError::Fetch(_) | BuildError::Publish(_) => StatusCode::BAD_GATEWAY,
        BuildError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        BuildError::Image(_) | BuildError::Archive(_) | BuildError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[derive(serde::Deserialize)]
pub struct GameQuery {
    id: Option<String>,
    code: Option<String>,
}

impl GameQuery {
    fn game_ref(&self) -> Result<GameRef, BuildError> {
        GameRef::from_parts(self.id.as_deref(), self.code.as_deref())
    }
}

/// GET /build/pack
pub async fn build_pack<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let game = query.game_ref()?;
    Ok(Json(state.pipeline.build_pack(&game).await?))
}

/// GET /build/sprite
pub async fn build_sprite<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let game = query.game_ref()?;
    Ok(Json(state.pipeline.build_sprite(&game).await?))
}

/// GET /build/bundle
pub async fn build_bundle<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let game = query.game_ref()?;
    let bundle = state.pipeline.build_bundle(&game).await?;

    let disposition = format!("attachment; filename=\"{}\"", bundle.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bundle.data,
    ))
}

/// GET /export
pub async fn export_config<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
    Query(query): Query<GameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let game = query.game_ref()?;
    let export = state.pipeline.export_game(&game).await?;

    Ok(([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(export)))
}

/// GET /games
pub async fn list_games<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.pipeline.list_games().await?))
}

/// GET /games/{id}
pub async fn get_game<G: GameStore, F: ImageFetcher, U: SheetUploader>(
    State(state): State<AppState<G, F, U>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let game = GameRef::Id(id);
    Ok(Json(state.pipeline.game_with_assets(&game).await?))
}
