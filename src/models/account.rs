use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Category, DateRange, ItemKey, ReviewKey};
use crate::error::{AppError, AppResult};

/// Highest value a priority slider can take
pub const MAX_PRIORITY: u32 = 10;

/// The four user-set priorities that drive category weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePriorities {
    pub story: u32,
    pub animation: u32,
    pub sound: u32,
    pub character: u32,
}

impl Default for BasePriorities {
    fn default() -> Self {
        Self {
            story: 1,
            animation: 1,
            sound: 1,
            character: 1,
        }
    }
}

impl BasePriorities {
    pub fn validate(&self) -> AppResult<()> {
        let values = [self.story, self.animation, self.sound, self.character];
        if values.iter().any(|v| *v > MAX_PRIORITY) {
            return Err(AppError::InvalidInput(format!(
                "priorities must lie in 0..={}",
                MAX_PRIORITY
            )));
        }
        Ok(())
    }

    pub fn total(&self) -> u32 {
        self.story + self.animation + self.sound + self.character
    }
}

/// Full priority vector: the four base priorities plus the calibrated
/// episode-length preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Priorities {
    #[serde(flatten)]
    pub base: BasePriorities,
    pub episodes: u32,
}

impl Priorities {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Story => self.base.story,
            Category::Animation => self.base.animation,
            Category::Sound => self.base.sound,
            Category::Character => self.base.character,
            Category::Enjoyment | Category::Overall => 0,
        }
    }
}

/// Normalized weights over story, animation, sound and character
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CategoryWeights {
    pub story: f64,
    pub animation: f64,
    pub sound: f64,
    pub character: f64,
}

impl CategoryWeights {
    /// Weight for a category; enjoyment and overall carry none.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Story => self.story,
            Category::Animation => self.animation,
            Category::Sound => self.sound,
            Category::Character => self.character,
            Category::Enjoyment | Category::Overall => 0.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.story + self.animation + self.sound + self.character
    }
}

/// Favorite era assigned to accounts that never chose one
pub fn default_favorite_era() -> DateRange {
    DateRange {
        start: NaiveDate::from_ymd_opt(1961, 1, 1).unwrap_or(NaiveDate::MIN),
        end: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN),
    }
}

/// A user profile node
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub favorites: BTreeSet<ItemKey>,
    pub priorities: Priorities,
    pub favorite_era: DateRange,
    /// Genres inferred from favorites and well-rated reviews
    pub affinity: BTreeSet<String>,
    pub weights: CategoryWeights,
    pub(crate) reviews: Vec<(ItemKey, ReviewKey)>,
    pub(crate) friends: Vec<super::AccountKey>,
}

impl Account {
    /// Creates an account with default priorities and era
    pub fn new(username: impl Into<String>, favorites: impl IntoIterator<Item = ItemKey>) -> Self {
        Self {
            username: username.into(),
            favorites: favorites.into_iter().collect(),
            priorities: Priorities::default(),
            favorite_era: default_favorite_era(),
            affinity: BTreeSet::new(),
            weights: CategoryWeights::default(),
            reviews: Vec::new(),
            friends: Vec::new(),
        }
    }

    pub fn with_priorities(mut self, base: BasePriorities) -> Self {
        self.priorities.base = base;
        self
    }

    pub fn with_favorite_era(mut self, era: DateRange) -> Self {
        self.favorite_era = era;
        self
    }

    /// Reviews given, in insertion order
    pub fn reviews(&self) -> &[(ItemKey, ReviewKey)] {
        &self.reviews
    }

    pub fn friends(&self) -> &[super::AccountKey] {
        &self.friends
    }

    /// Favorites plus reviewed items
    pub fn seen_items(&self) -> BTreeSet<ItemKey> {
        self.favorites
            .iter()
            .copied()
            .chain(self.reviews.iter().map(|(item, _)| *item))
            .collect()
    }

    pub fn has_reviewed(&self, item: ItemKey) -> bool {
        self.reviews.iter().any(|(reviewed, _)| *reviewed == item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_defaults() {
        let account = Account::new("alan", vec![ItemKey(0)]);
        assert_eq!(account.priorities.base, BasePriorities::default());
        assert_eq!(account.priorities.episodes, 0);
        assert_eq!(account.favorite_era, default_favorite_era());
        assert!(account.affinity.is_empty());
        assert!(account.friends().is_empty());
    }

    #[test]
    fn test_priorities_validate() {
        let priorities = BasePriorities {
            story: 11,
            ..BasePriorities::default()
        };
        assert!(priorities.validate().is_err());
        assert!(BasePriorities::default().validate().is_ok());
    }

    #[test]
    fn test_seen_items_unions_favorites_and_reviews() {
        let mut account = Account::new("alan", vec![ItemKey(0), ItemKey(2)]);
        account.reviews.push((ItemKey(2), ReviewKey(0)));
        account.reviews.push((ItemKey(5), ReviewKey(1)));
        let seen: Vec<ItemKey> = account.seen_items().into_iter().collect();
        assert_eq!(seen, vec![ItemKey(0), ItemKey(2), ItemKey(5)]);
        assert!(account.has_reviewed(ItemKey(5)));
        assert!(!account.has_reviewed(ItemKey(0)));
    }

    #[test]
    fn test_priorities_serialize_flat() {
        let priorities = Priorities {
            base: BasePriorities::default(),
            episodes: 24,
        };
        let json = serde_json::to_value(priorities).unwrap();
        assert_eq!(json["story"], 1);
        assert_eq!(json["episodes"], 24);
    }
}
