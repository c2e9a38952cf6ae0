use std::collections::{BTreeSet, HashMap};

use crate::{
    error::{AppError, AppResult},
    models::{AccountKey, Category, CategoryWeights, Graph, ItemKey},
};

/// Reviews rated strictly above this overall score count toward preferences
pub const LIKED_OVERALL_THRESHOLD: u8 = 4;

/// Favorites plus items the account rated above the liked threshold
pub fn preference_source(graph: &Graph, account: AccountKey) -> BTreeSet<ItemKey> {
    let account = graph.account(account);
    let liked = account
        .reviews()
        .iter()
        .filter(|(_, review)| graph.review(*review).ratings.overall > LIKED_OVERALL_THRESHOLD)
        .map(|(item, _)| *item);
    account.favorites.iter().copied().chain(liked).collect()
}

/// Infers the account's genre affinity and episode-length preference.
///
/// A genre joins the affinity set when it appears in at least half (floored)
/// of the source items. The episode priority becomes the floored mean
/// episode count over the same items.
pub fn calibrate_genre_affinity(graph: &mut Graph, key: AccountKey) -> AppResult<()> {
    let source = preference_source(graph, key);
    if source.is_empty() {
        return Err(AppError::EmptyPreferenceSource(
            graph.account(key).username.clone(),
        ));
    }

    let mut genre_counts: HashMap<&str, usize> = HashMap::new();
    let mut episode_total: u64 = 0;
    for item_key in &source {
        let item = graph.item(*item_key);
        episode_total += u64::from(item.episodes);
        for genre in &item.genres {
            *genre_counts.entry(genre.as_str()).or_default() += 1;
        }
    }

    let threshold = source.len() / 2;
    let affinity: BTreeSet<String> = genre_counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(genre, _)| genre.to_string())
        .collect();
    let episodes = (episode_total / source.len() as u64) as u32;

    tracing::debug!(
        account = %graph.account(key).username,
        source_items = source.len(),
        affinity = ?affinity,
        episodes,
        "Calibrated genre affinity"
    );

    let account = graph.account_mut(key);
    account.affinity = affinity;
    account.priorities.episodes = episodes;
    Ok(())
}

/// Normalizes the four base priorities into category weights
pub fn derive_weights(graph: &mut Graph, key: AccountKey) -> AppResult<()> {
    let account = graph.account_mut(key);
    let total = account.priorities.base.total();
    if total == 0 {
        return Err(AppError::ZeroPriorityMass(account.username.clone()));
    }

    let total = f64::from(total);
    let priorities = account.priorities;
    let weight = |category: Category| f64::from(priorities.get(category)) / total;
    account.weights = CategoryWeights {
        story: weight(Category::Story),
        animation: weight(Category::Animation),
        sound: weight(Category::Sound),
        character: weight(Category::Character),
    };
    Ok(())
}

/// Recomputes every derived preference field of an account
pub fn recalibrate(graph: &mut Graph, key: AccountKey) -> AppResult<()> {
    calibrate_genre_affinity(graph, key)?;
    derive_weights(graph, key)
}
