use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{round2, Account, Category, Graph, Item, ItemKey, RatingAverages},
};

/// Standard deviation of episode counts across the cleaned historical catalog
pub const EPISODE_STDDEV: f64 = 39.64;
/// Shortest episode count observed in the cleaned catalog
pub const MIN_EPISODES: f64 = 1.0;
/// Longest episode count observed in the cleaned catalog
pub const MAX_EPISODES: f64 = 773.0;

/// The individual terms that make up a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityBreakdown {
    pub weighted_avg: f64,
    pub genre_match: f64,
    pub episode_score: f64,
    pub date_score: f64,
    pub score: f64,
}

/// Priority-weighted sum of the base category averages
pub fn weighted_sum(account: &Account, averages: &RatingAverages) -> f64 {
    Category::WEIGHTED
        .iter()
        .map(|c| account.weights.get(*c) * averages.get(*c))
        .sum()
}

/// Weighted sum scaled to 0..1
pub fn weighted_average(account: &Account, averages: &RatingAverages) -> f64 {
    weighted_sum(account, averages) / 10.0
}

/// Share of the account's favorite era during which the item aired
pub fn date_score(account: &Account, item: &Item) -> f64 {
    let era = &account.favorite_era;
    round2(era.overlap_days(&item.aired) as f64 / era.len_days() as f64)
}

/// Jaccard index between the account's genre affinity and the item's genres
pub fn genre_match_index(account: &Account, item: &Item) -> AppResult<f64> {
    let shared = account.affinity.intersection(&item.genres).count();
    let total = account.affinity.union(&item.genres).count();
    if total == 0 {
        return Err(AppError::InvalidQuery(format!(
            "no genres to compare between '{}' and item {}",
            account.username, item.id
        )));
    }
    Ok(round2(shared as f64 / total as f64))
}

/// How close the item's length is to the account's preferred episode count.
///
/// 1.0 at the preferred length, falling linearly (in standard deviations)
/// toward 0.0 at the shortest or longest historical length. Lengths outside
/// the historical range fall below zero and are left unclamped. Past a
/// preference of exactly 1 or 773 episodes the score is 0.0.
pub fn episode_score(account: &Account, item: &Item) -> f64 {
    let mid = f64::from(account.priorities.episodes);
    let episodes = f64::from(item.episodes);
    if episodes == mid {
        return 1.0;
    }

    let (deviations, max_deviations) = if episodes < mid {
        ((mid - episodes) / EPISODE_STDDEV, (mid - MIN_EPISODES) / EPISODE_STDDEV)
    } else {
        ((episodes - mid) / EPISODE_STDDEV, (MAX_EPISODES - mid) / EPISODE_STDDEV)
    };
    // a preference sitting on a historical bound leaves that side no width
    if max_deviations == 0.0 {
        return 0.0;
    }
    round2(1.0 - deviations / max_deviations)
}

/// Scores how well an item suits an account, on a 0..10 scale
pub fn similarity_breakdown(
    graph: &Graph,
    account: &Account,
    item_key: ItemKey,
) -> AppResult<SimilarityBreakdown> {
    let item = graph.item(item_key);
    let weighted_avg = weighted_average(account, &graph.average_ratings(item_key));
    let genre_match = genre_match_index(account, item)?;
    let episode_score = episode_score(account, item);
    let date_score = date_score(account, item);

    let score = round2(
        0.5 * weighted_avg + 0.3 * genre_match + 0.1 * episode_score + 0.1 * date_score,
    ) * 10.0;

    Ok(SimilarityBreakdown {
        weighted_avg,
        genre_match,
        episode_score,
        date_score,
        score,
    })
}

/// Compatibility score between an account and an item
pub fn similarity(graph: &Graph, account: &Account, item: ItemKey) -> AppResult<f64> {
    similarity_breakdown(graph, account, item).map(|breakdown| breakdown.score)
}
