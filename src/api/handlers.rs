use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::error::AppResult;
use crate::middleware::RequestId;
use crate::models::{
    AccountKey, BasePriorities, CategoryWeights, DateRange, Graph, Item, ItemId, Priorities,
    ProfileRecord, RatingAverages, Ratings,
};
use crate::services::{
    profiles, recommendations, similarity::similarity_breakdown, title_search, RatingInput,
    Recommendation, SearchHit,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub favorites: Vec<ItemId>,
}

#[derive(Debug, Deserialize)]
pub struct AddFriendRequest {
    pub friend: String,
}

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub item_id: ItemId,
    pub ratings: RatingInput,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub priorities: Option<BasePriorities>,
    pub favorite_era: Option<DateRange>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: ItemId,
    pub title: String,
    pub episodes: u32,
    pub genres: BTreeSet<String>,
    pub aired: DateRange,
    pub tags: BTreeSet<String>,
    pub reviewers: usize,
    pub average_ratings: RatingAverages,
}

impl ItemResponse {
    fn new(item: &Item, average_ratings: RatingAverages) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            episodes: item.episodes,
            genres: item.genres.clone(),
            aired: item.aired,
            tags: item.tags.clone(),
            reviewers: item.reviewer_count(),
            average_ratings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub username: String,
    pub favorites: Vec<ItemId>,
    pub friends: Vec<String>,
    pub priorities: Priorities,
    pub favorite_era: DateRange,
    pub affinity: BTreeSet<String>,
    pub weights: CategoryWeights,
}

impl AccountResponse {
    fn new(graph: &Graph, key: AccountKey) -> Self {
        let account = graph.account(key);
        Self {
            username: account.username.clone(),
            favorites: account
                .favorites
                .iter()
                .map(|item| graph.item(*item).id)
                .collect(),
            friends: account
                .friends()
                .iter()
                .map(|friend| graph.account(*friend).username.clone())
                .collect(),
            priorities: account.priorities,
            favorite_era: account.favorite_era,
            affinity: account.affinity.clone(),
            weights: account.weights,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub username: String,
    pub item_id: ItemId,
    pub ratings: Ratings,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let graph = state.graph.read().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "items": graph.item_count(),
            "accounts": graph.account_count(),
            "reviews": graph.review_count(),
        })),
    )
}

/// Keyword search over item titles
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SearchHit>>> {
    let graph = state.graph.read().await;
    let hits = title_search::search_titles(&graph, &params.q)?;
    Ok(Json(hits))
}

/// Item details with current average ratings
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<ItemResponse>> {
    let graph = state.graph.read().await;
    let key = graph.item_key(ItemId(id))?;
    Ok(Json(ItemResponse::new(graph.item(key), graph.average_ratings(key))))
}

/// Create a new account from a list of favorites
pub async fn create_account(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    tracing::info!(%request_id, username = %request.username, "Creating account");

    let mut graph = state.graph.write().await;
    let key = profiles::create_account(&mut graph, &request.username, &request.favorites)?;
    Ok((StatusCode::CREATED, Json(AccountResponse::new(&graph, key))))
}

/// Restore an account from an exported profile
pub async fn import_profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(record): Json<ProfileRecord>,
) -> AppResult<(StatusCode, Json<AccountResponse>)> {
    tracing::info!(%request_id, username = %record.username, "Importing profile");

    let mut graph = state.graph.write().await;
    let key = profiles::import_profile(&mut graph, record)?;
    Ok((StatusCode::CREATED, Json(AccountResponse::new(&graph, key))))
}

/// Export an account as a portable profile record
pub async fn export_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileRecord>> {
    let graph = state.graph.read().await;
    Ok(Json(profiles::export_profile(&graph, &username)?))
}

/// Link the account with another as friends
pub async fn add_friend(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<AddFriendRequest>,
) -> AppResult<Json<AccountResponse>> {
    let mut graph = state.graph.write().await;
    profiles::befriend(&mut graph, &username, &request.friend)?;
    let key = graph.account_key(&username)?;
    Ok(Json(AccountResponse::new(&graph, key)))
}

/// Rate an item on behalf of the account
pub async fn add_review(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(username): Path<String>,
    Json(request): Json<AddReviewRequest>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    tracing::debug!(%request_id, %username, item = %request.item_id, "Adding review");

    let mut graph = state.graph.write().await;
    let review = profiles::rate_item(&mut graph, &username, request.item_id, request.ratings)?;
    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            username,
            item_id: request.item_id,
            ratings: graph.review(review).ratings,
        }),
    ))
}

/// Replace the account's priorities and/or favorite era
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<AccountResponse>> {
    let mut graph = state.graph.write().await;
    profiles::update_preferences(
        &mut graph,
        &username,
        request.priorities,
        request.favorite_era,
    )?;
    let key = graph.account_key(&username)?;
    Ok(Json(AccountResponse::new(&graph, key)))
}

/// Path-based recommendations for the account
pub async fn recommend(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let mut options = state.options;
    if let Some(limit) = params.limit {
        options.limit = limit;
    }

    let graph = state.graph.read().await;
    let key = graph.account_key(&username)?;
    let ranked = recommendations::rank_for_account(&graph, key, options)?;
    Ok(Json(ranked))
}

/// Recommendations drawn from the account's friends
pub async fn recommend_from_friends(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let limit = params.limit.unwrap_or(state.options.limit);

    let graph = state.graph.read().await;
    let key = graph.account_key(&username)?;
    let ranked = recommendations::recommend_from_friends(&graph, key, limit)?;
    Ok(Json(ranked))
}

/// Breakdown of the similarity score between an account and an item
pub async fn explain_similarity(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, u64)>,
) -> AppResult<Json<Value>> {
    let graph = state.graph.read().await;
    let account = graph.account(graph.account_key(&username)?);
    let item = graph.item_key(ItemId(id))?;
    let breakdown = similarity_breakdown(&graph, account, item)?;
    Ok(Json(json!({
        "username": username,
        "item_id": id,
        "similarity": breakdown,
    })))
}
