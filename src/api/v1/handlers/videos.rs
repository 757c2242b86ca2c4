/*
 * Responsibility
 * - /media/videos CRUD handlers
 * - Route protection is applied in routes.rs; handlers receive the caller via `Identity`
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::videos::{CreateVideoRequest, VideoResponse, VideosResponse},
        extractors::Identity,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_videos(
    State(state): State<AppState>,
    Identity(_caller): Identity,
) -> Result<Json<VideosResponse>, AppError> {
    let videos = state.videos.list().await?;

    Ok(Json(VideosResponse {
        videos: videos.into_iter().map(VideoResponse::from).collect(),
    }))
}

pub async fn get_video(
    State(state): State<AppState>,
    Identity(_caller): Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoResponse>, AppError> {
    let video = state.videos.get(id).await?;
    Ok(Json(video.into()))
}

pub async fn create_video(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Json(req): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_VIDEO", msg))?;

    let video = state.videos.create(req.into_new_video()).await?;

    tracing::info!(video_id = %video.id, sub = %caller.subject, "video created");

    Ok((StatusCode::CREATED, Json(video.into())))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Identity(caller): Identity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.videos.delete(id).await?;

    tracing::info!(video_id = %id, sub = %caller.subject, "video deleted");

    Ok(StatusCode::NO_CONTENT)
}
