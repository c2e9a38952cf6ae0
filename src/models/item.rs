use serde::Serialize;
use std::collections::BTreeSet;

use super::{AccountKey, DateRange, ItemId, ReviewKey};
use crate::error::{AppError, AppResult};
use crate::services::tags::extract_tags;

/// A catalog entry (an anime series or film)
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub episodes: u32,
    pub genres: BTreeSet<String>,
    pub aired: DateRange,
    /// Normalized title keywords, fixed at construction
    pub tags: BTreeSet<String>,
    /// Incoming reviews in insertion order
    #[serde(skip)]
    pub(crate) reviews: Vec<(AccountKey, ReviewKey)>,
}

impl Item {
    /// Creates an item, deriving its search tags from the title
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        episodes: u32,
        genres: impl IntoIterator<Item = String>,
        aired: DateRange,
    ) -> AppResult<Self> {
        let title = title.into();
        let genres: BTreeSet<String> = genres.into_iter().collect();

        if episodes == 0 {
            return Err(AppError::InvalidInput(format!(
                "item {} must have at least one episode",
                id
            )));
        }
        if genres.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "item {} must have at least one genre",
                id
            )));
        }
        aired.validate()?;

        let tags = extract_tags(&title);
        if tags.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "title '{}' has no searchable keywords",
                title
            )));
        }

        Ok(Self {
            id,
            title,
            episodes,
            genres,
            aired,
            tags,
            reviews: Vec::new(),
        })
    }

    /// Human-readable `"title, id"` label
    pub fn label(&self) -> String {
        format!("{}, {}", self.title, self.id)
    }

    pub fn reviewer_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn reviews(&self) -> &[(AccountKey, ReviewKey)] {
        &self.reviews
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn aired() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2013, 4, 7).unwrap(),
            NaiveDate::from_ymd_opt(2013, 9, 29).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_item_tags_title() {
        let item = Item::new(
            ItemId(16498),
            "Shingeki no Kyojin",
            25,
            vec!["Action".to_string(), "Drama".to_string()],
            aired(),
        )
        .unwrap();

        assert_eq!(item.label(), "Shingeki no Kyojin, 16498");
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["kyojin", "shingeki"]);
        assert_eq!(item.reviewer_count(), 0);
    }

    #[test]
    fn test_new_item_rejects_zero_episodes() {
        let result = Item::new(ItemId(1), "Toradora", 0, vec!["Romance".to_string()], aired());
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_new_item_rejects_stop_word_title() {
        let result = Item::new(ItemId(2), "The OVA", 2, vec!["Comedy".to_string()], aired());
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_new_item_rejects_empty_genres() {
        let result = Item::new(ItemId(3), "Monster", 74, Vec::new(), aired());
        assert!(result.is_err());
    }
}
