use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;

use super::paths::{
    path_endpoint, EndpointSet, PathEnumerator, ReviewPath, DEFAULT_MAX_DEPTH, MIN_PATH_EDGES,
};
use super::similarity::{similarity, weighted_sum};
use crate::{
    error::{AppError, AppResult},
    models::{Account, AccountKey, Graph, ItemId, ItemKey, RatingAverages, ReviewKey},
};

/// Number of recommendations returned by default
pub const DEFAULT_LIMIT: usize = 10;

/// Tuning for recommendation queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendOptions {
    pub max_depth: usize,
    pub limit: usize,
    pub visit_budget: Option<usize>,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            limit: DEFAULT_LIMIT,
            visit_budget: None,
        }
    }
}

/// A ranked candidate item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub score: f64,
}

impl Recommendation {
    fn new(graph: &Graph, item: ItemKey, score: f64) -> Self {
        let item = graph.item(item);
        Self {
            item_id: item.id,
            title: item.title.clone(),
            score,
        }
    }
}

/// Sorts by descending score, keeping discovery order among ties
fn rank(mut scored: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

/// Scores one enumerated path for the account.
///
/// Ratings along every edge but the first are averaged into a consensus.
/// The account's own term is computed from that same consensus rather than
/// from the first edge.
pub fn score_path(graph: &Graph, account: &Account, path: &[ReviewKey]) -> AppResult<f64> {
    let candidate = path_endpoint(graph, path)
        .ok_or_else(|| AppError::InvalidInput("cannot score an empty path".to_string()))?;
    if path.len() < 2 {
        return Err(AppError::InvalidInput(format!(
            "path to item {} is too short to score",
            graph.item(candidate).id
        )));
    }

    let consensus =
        RatingAverages::mean_of(path[1..].iter().map(|review| &graph.review(*review).ratings));
    let own = consensus;

    let weighted_avg = weighted_sum(account, &consensus);
    let own_weighted_avg = weighted_sum(account, &own);
    let sim = similarity(graph, account, candidate)?;

    Ok((0.5 * weighted_avg
        + 0.1 * consensus.overall
        + 0.1 * consensus.enjoyment
        + 0.2 * own_weighted_avg
        + 0.1 * ((own.overall + own.enjoyment) / 2.0)
        + sim)
        / 2.0)
}

/// Ranks multi-hop candidates reached through people who reviewed what the
/// account has seen.
pub fn rank_for_account(
    graph: &Graph,
    key: AccountKey,
    options: RecommendOptions,
) -> AppResult<Vec<Recommendation>> {
    let start = Instant::now();
    let account = graph.account(key);

    let mut endpoints = EndpointSet::seeded(account.seen_items());
    let paths: Vec<ReviewPath> = PathEnumerator::new(graph)
        .with_max_depth(options.max_depth)
        .with_visit_budget(options.visit_budget)
        .enumerate(key, &mut endpoints)
        .into_iter()
        .filter(|path| path.len() > MIN_PATH_EDGES)
        .collect();

    let mut scored = Vec::with_capacity(paths.len());
    for path in &paths {
        let Some(item) = path_endpoint(graph, path) else {
            continue;
        };
        scored.push(Recommendation::new(graph, item, score_path(graph, account, path)?));
    }
    let ranked = rank(scored, options.limit);

    tracing::info!(
        account = %account.username,
        paths = paths.len(),
        returned = ranked.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Ranked path recommendations"
    );
    Ok(ranked)
}

/// Ranks items the account's friends have favorited or reviewed but the
/// account has not seen. No friends yields an empty list.
pub fn recommend_from_friends(
    graph: &Graph,
    key: AccountKey,
    limit: usize,
) -> AppResult<Vec<Recommendation>> {
    let account = graph.account(key);
    let seen = account.seen_items();

    let candidates: BTreeSet<ItemKey> = account
        .friends()
        .iter()
        .flat_map(|friend| graph.account(*friend).seen_items())
        .filter(|item| !seen.contains(item))
        .collect();

    let mut scored = Vec::with_capacity(candidates.len());
    for item in candidates {
        scored.push(Recommendation::new(graph, item, similarity(graph, account, item)?));
    }
    let ranked = rank(scored, limit);

    tracing::info!(
        account = %account.username,
        friends = account.friends().len(),
        returned = ranked.len(),
        "Ranked friend recommendations"
    );
    Ok(ranked)
}
