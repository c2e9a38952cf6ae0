use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

pub mod account;
pub mod graph;
pub mod item;
pub mod records;
pub mod review;

pub use account::{Account, BasePriorities, CategoryWeights, Priorities};
pub use graph::{AccountKey, Graph, ItemKey, Node, ReviewKey};
pub use item::Item;
pub use records::{AccountRecord, Catalog, ItemRecord, ProfileRecord, ProfileReview, ReviewRecord};
pub use review::Review;

/// Catalog identifier of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Rating categories
// ============================================================================

/// The six categories carried by every review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Story,
    Animation,
    Sound,
    Character,
    Enjoyment,
    Overall,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Story,
        Category::Animation,
        Category::Sound,
        Category::Character,
        Category::Enjoyment,
        Category::Overall,
    ];

    /// Categories that receive a priority-derived weight
    pub const WEIGHTED: [Category; 4] = [
        Category::Story,
        Category::Animation,
        Category::Sound,
        Category::Character,
    ];
}

/// Highest rating a review may give in any category
pub const MAX_RATING: u8 = 10;

/// One review's ratings, each in `0..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ratings {
    pub story: u8,
    pub animation: u8,
    pub sound: u8,
    pub character: u8,
    pub enjoyment: u8,
    pub overall: u8,
}

impl Ratings {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Story => self.story,
            Category::Animation => self.animation,
            Category::Sound => self.sound,
            Category::Character => self.character,
            Category::Enjoyment => self.enjoyment,
            Category::Overall => self.overall,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        match Category::ALL.iter().find(|c| self.get(**c) > MAX_RATING) {
            Some(category) => Err(AppError::InvalidInput(format!(
                "{:?} rating {} is outside 0..={}",
                category,
                self.get(*category),
                MAX_RATING
            ))),
            None => Ok(()),
        }
    }
}

/// Per-category means over a set of reviews
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingAverages {
    pub story: f64,
    pub animation: f64,
    pub sound: f64,
    pub character: f64,
    pub enjoyment: f64,
    pub overall: f64,
}

impl RatingAverages {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Story => self.story,
            Category::Animation => self.animation,
            Category::Sound => self.sound,
            Category::Character => self.character,
            Category::Enjoyment => self.enjoyment,
            Category::Overall => self.overall,
        }
    }

    fn slot(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Story => &mut self.story,
            Category::Animation => &mut self.animation,
            Category::Sound => &mut self.sound,
            Category::Character => &mut self.character,
            Category::Enjoyment => &mut self.enjoyment,
            Category::Overall => &mut self.overall,
        }
    }

    /// Plain mean of every category over `ratings`; all-zero when empty.
    pub fn mean_of<'a>(ratings: impl IntoIterator<Item = &'a Ratings>) -> Self {
        let mut sums = Self::default();
        let mut count = 0usize;
        for rating in ratings {
            for category in Category::ALL {
                *sums.slot(category) += f64::from(rating.get(category));
            }
            count += 1;
        }
        if count == 0 {
            return sums;
        }
        sums.map(|sum| sum / count as f64)
    }

    pub fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        for category in Category::ALL {
            let value = self.get(category);
            *self.slot(category) = f(value);
        }
        self
    }
}

/// Round to two decimal places, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

// ============================================================================
// Date intervals
// ============================================================================

/// Inclusive calendar interval, used for air dates and favorite eras
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting `start >= end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.start >= self.end {
            return Err(AppError::InvalidInput(format!(
                "date range must start before it ends ({} .. {})",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Length in days, counting both endpoints
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Days shared with `other`, counting both endpoints; zero when disjoint
    pub fn overlap_days(&self, other: &DateRange) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        ((end - start).num_days() + 1).max(0)
    }
}
