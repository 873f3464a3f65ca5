use super::coordinator::Leaderboard;
use super::error::LeaderboardError;
use super::protocol::*;
use super::types::{GroupUpdate, LeaderboardStats, Member, Profile};

use axum::{
    Extension, Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use std::sync::Arc;

/// Public routes of the leaderboard service.
pub fn router(leaderboard: Arc<Leaderboard>) -> Router {
    Router::new()
        .route(ENDPOINT_USER, post(handle_add_member))
        .route(ENDPOINT_USER_BY_ID, delete(handle_remove_member))
        .route(ENDPOINT_INCREMENT, post(handle_increment))
        .route(ENDPOINT_DECREMENT, post(handle_decrement))
        .route(ENDPOINT_CHANGE_GROUP, put(handle_change_group))
        .route(ENDPOINT_TOP_GLOBAL, get(handle_top_global))
        .route(ENDPOINT_TOP_GROUP, get(handle_top_group))
        .route(ENDPOINT_RANK, get(handle_rank))
        .route(ENDPOINT_PROFILE, get(handle_profile))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(leaderboard))
}

impl IntoResponse for LeaderboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            LeaderboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LeaderboardError::NotFound(_) | LeaderboardError::EmptyScope(_) => StatusCode::NOT_FOUND,
            LeaderboardError::BackendFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, LeaderboardError>;

pub async fn handle_add_member(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Json(member): Json<Member>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let id = member.id.clone();
    leaderboard.add_member(member).await?;
    tracing::info!("Member {} added", id);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("User {} added", id))),
    ))
}

pub async fn handle_remove_member(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    leaderboard.remove_member(&user_id).await?;
    Ok(Json(MessageResponse::new(format!("User {} removed", user_id))))
}

pub async fn handle_increment(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(user_id): Path<String>,
    Query(params): Query<ScoreParams>,
) -> ApiResult<Json<MessageResponse>> {
    let amount = parse_score(params.score.as_deref())?;
    leaderboard
        .adjust_score(&user_id, GroupUpdate::from_option(params.group), amount)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Score incremented for user {}",
        user_id
    ))))
}

pub async fn handle_decrement(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(user_id): Path<String>,
    Query(params): Query<ScoreParams>,
) -> ApiResult<Json<MessageResponse>> {
    let amount = parse_score(params.score.as_deref())?;
    leaderboard
        .adjust_score(&user_id, GroupUpdate::from_option(params.group), -amount)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Score decremented for user {}",
        user_id
    ))))
}

pub async fn handle_change_group(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path((user_id, group)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    if leaderboard.group_of(&user_id).await? == group {
        return Ok(Json(MessageResponse::new("Entity unchanged")));
    }
    leaderboard.change_group(&user_id, &group).await?;
    Ok(Json(MessageResponse::new(format!(
        "Entity updated to {} for user {}",
        group, user_id
    ))))
}

pub async fn handle_top_global(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(leaderboard.top_global().await?))
}

pub async fn handle_top_group(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(group): Path<String>,
) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(leaderboard.top_in_group(&group).await?))
}

pub async fn handle_rank(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RankResponse>> {
    let global_rank = leaderboard.rank_global(&user_id).await?;
    let group_rank = leaderboard.rank_in_group(&user_id).await?;
    Ok(Json(RankResponse {
        global_rank,
        group_rank,
    }))
}

pub async fn handle_profile(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Profile>> {
    Ok(Json(leaderboard.profile(&user_id).await?))
}

pub async fn handle_stats(
    Extension(leaderboard): Extension<Arc<Leaderboard>>,
) -> ApiResult<Json<LeaderboardStats>> {
    Ok(Json(leaderboard.stats().await?))
}

fn parse_score(raw: Option<&str>) -> Result<f64, LeaderboardError> {
    raw.unwrap_or_default()
        .trim()
        .parse::<f64>()
        .map_err(|_| LeaderboardError::invalid("Invalid score"))
}
