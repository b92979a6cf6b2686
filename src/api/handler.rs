use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use crate::api::server::{AppState, JsonResult, RouteError};
use crate::constants::GLOBAL_SCOPE;
use crate::db::prelude::{HistoryQuery, MedalChange, Pagination, Player, RankedScore};
use crate::score::Platform;

/// Path params arrive as strings; the platform segment must be one of the
/// two numeric platform ids.
fn parse_platform(raw: &str) -> Result<Platform, RouteError> {
    raw.parse::<i16>()
        .ok()
        .and_then(|value| Platform::try_from(value).ok())
        .ok_or_else(|| RouteError::InvalidPlatform(raw.to_string()))
}

fn validate_page(page: i64) -> Result<i64, RouteError> {
    if page < 0 {
        return Err(RouteError::InvalidPage(page));
    }
    Ok(page)
}

#[instrument(skip(state))]
pub async fn player(
    State(state): State<Arc<AppState>>,
    Path((platform, region, player_id)): Path<(String, String, String)>,
) -> JsonResult<Player> {
    let platform = parse_platform(&platform)?;

    match state.store.player(platform, &player_id).await? {
        Some(found) if region == GLOBAL_SCOPE || found.region == region => Ok(Json(found)),
        _ => Err(RouteError::NotFound("player")),
    }
}

#[instrument(skip(state))]
pub async fn player_changes(
    State(state): State<Arc<AppState>>,
    Path((platform, _region, player_id)): Path<(String, String, String)>,
    Query(query): Query<HistoryQuery>,
) -> JsonResult<Vec<MedalChange>> {
    let platform = parse_platform(&platform)?;
    let page = validate_page(query.page)?;

    let changes = state
        .store
        .changes(platform, &player_id, page, query.before, query.after)
        .await?;

    Ok(Json(changes))
}

#[instrument(skip(state))]
pub async fn score_by_id(
    State(state): State<Arc<AppState>>,
    Path((platform, score_id)): Path<(String, String)>,
) -> JsonResult<RankedScore> {
    let platform = parse_platform(&platform)?;

    match state.store.score_by_id(platform, &score_id).await? {
        Some(found) => Ok(Json(found)),
        None => Err(RouteError::NotFound("score")),
    }
}

#[instrument(skip(state))]
pub async fn player_scores(
    State(state): State<Arc<AppState>>,
    Path((platform, region, player_id)): Path<(String, String, String)>,
    Query(query): Query<HistoryQuery>,
) -> JsonResult<Vec<RankedScore>> {
    let platform = parse_platform(&platform)?;
    let page = validate_page(query.page)?;

    if state.store.player(platform, &player_id).await?.is_none() {
        return Err(RouteError::NotFound("player"));
    }

    let scores = state
        .store
        .player_scores(platform, &region, &player_id, page, query.before, query.after)
        .await?;

    Ok(Json(scores))
}

#[instrument(skip(state))]
pub async fn region_leaderboard(
    State(state): State<Arc<AppState>>,
    Path((platform, region)): Path<(String, String)>,
    Query(query): Query<Pagination>,
) -> JsonResult<Vec<Player>> {
    let platform = parse_platform(&platform)?;
    let page = validate_page(query.page)?;

    let players = state.store.top_medal_holders(platform, &region, page).await?;

    Ok(Json(players))
}
