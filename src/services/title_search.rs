use serde::Serialize;

use super::tags::extract_tags;
use crate::{
    error::{AppError, AppResult},
    models::{Graph, ItemId},
};

/// Minimum share of query keywords an item title must cover
pub const MIN_KEYWORD_SHARE: f64 = 0.5;

/// A title matching a search query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// `"title, id"`
    pub label: String,
    pub item_id: ItemId,
    pub score: f64,
}

/// Literal keyword search over item titles.
///
/// An item matches when its keywords are a strict subset of the query's, or
/// when it covers at least half of the query's keywords. The score is the
/// share of query keywords found in the title. Matches are returned best
/// first, ties in catalog order.
///
/// A query with no keywords left after normalization is rejected up front
/// with `InvalidQuery`, before any item is examined.
pub fn search_titles(graph: &Graph, query: &str) -> AppResult<Vec<SearchHit>> {
    let query_tags = extract_tags(query);
    if query_tags.is_empty() {
        return Err(AppError::InvalidQuery(
            "query must contain alphanumeric keywords beyond common words such as 'the' or 'and'"
                .to_string(),
        ));
    }

    let query_len = query_tags.len() as f64;
    let mut hits: Vec<SearchHit> = graph
        .items()
        .filter_map(|(_, item)| {
            let shared = item.tags.intersection(&query_tags).count();
            let contained = item.tags.len() < query_tags.len() && shared == item.tags.len();
            let share = shared as f64 / query_len;
            (contained || share >= MIN_KEYWORD_SHARE).then(|| SearchHit {
                label: item.label(),
                item_id: item.id,
                score: share,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::debug!(query, keywords = query_tags.len(), hits = hits.len(), "Title search");
    Ok(hits)
}
