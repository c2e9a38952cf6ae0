use serde::Deserialize;
use std::collections::HashSet;

use super::calibration::{derive_weights, preference_source, recalibrate, LIKED_OVERALL_THRESHOLD};
use crate::{
    error::{AppError, AppResult},
    models::{
        Account, AccountKey, BasePriorities, DateRange, Graph, ItemId, ProfileRecord,
        ProfileReview, Ratings, ReviewKey,
    },
};

/// Ratings submitted for a new review. `overall` is derived when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RatingInput {
    pub story: u8,
    pub animation: u8,
    pub sound: u8,
    pub character: u8,
    pub enjoyment: u8,
    #[serde(default)]
    pub overall: Option<u8>,
}

impl RatingInput {
    /// Resolves into full ratings, filling `overall` with the floored mean of
    /// the five other categories
    pub fn into_ratings(self) -> AppResult<Ratings> {
        let base = [
            self.story,
            self.animation,
            self.sound,
            self.character,
            self.enjoyment,
        ];
        let derived = (base.iter().map(|v| u32::from(*v)).sum::<u32>() / 5) as u8;
        let ratings = Ratings {
            story: self.story,
            animation: self.animation,
            sound: self.sound,
            character: self.character,
            enjoyment: self.enjoyment,
            overall: self.overall.unwrap_or(derived),
        };
        ratings.validate()?;
        Ok(ratings)
    }
}

/// Registers a new account and calibrates it from its favorites
pub fn create_account(
    graph: &mut Graph,
    username: &str,
    favorites: &[ItemId],
) -> AppResult<AccountKey> {
    if username.trim().is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".to_string()));
    }
    if favorites.is_empty() {
        return Err(AppError::EmptyPreferenceSource(username.to_string()));
    }
    if graph.contains_account(username) {
        return Err(AppError::InvalidInput(format!(
            "account '{}' already exists",
            username
        )));
    }
    let favorites = favorites
        .iter()
        .map(|id| graph.item_key(*id))
        .collect::<AppResult<Vec<_>>>()?;

    let key = graph.insert_account(Account::new(username, favorites))?;
    recalibrate(graph, key)?;

    tracing::info!(
        account = username,
        favorites = graph.account(key).favorites.len(),
        "Account created"
    );
    Ok(key)
}

/// Records a review and recalibrates the reviewer
pub fn rate_item(
    graph: &mut Graph,
    username: &str,
    item_id: ItemId,
    input: RatingInput,
) -> AppResult<ReviewKey> {
    let ratings = input.into_ratings()?;
    let account = graph.account_key(username)?;
    let item = graph.item_key(item_id)?;

    let review = graph.add_review(account, item, ratings)?;
    refresh(graph, account)?;

    tracing::info!(
        account = username,
        item = %item_id,
        overall = ratings.overall,
        "Review added"
    );
    Ok(review)
}

/// Replaces the base priorities and/or favorite era, then rederives weights
pub fn update_preferences(
    graph: &mut Graph,
    username: &str,
    priorities: Option<BasePriorities>,
    favorite_era: Option<DateRange>,
) -> AppResult<()> {
    let key = graph.account_key(username)?;
    if let Some(priorities) = &priorities {
        priorities.validate()?;
        if priorities.total() == 0 {
            return Err(AppError::ZeroPriorityMass(username.to_string()));
        }
    }
    if let Some(era) = &favorite_era {
        era.validate()?;
    }

    let account = graph.account_mut(key);
    if let Some(priorities) = priorities {
        account.priorities.base = priorities;
    }
    if let Some(era) = favorite_era {
        account.favorite_era = era;
    }
    derive_weights(graph, key)?;

    tracing::info!(account = username, "Preferences updated");
    Ok(())
}

/// Links two accounts as friends
pub fn befriend(graph: &mut Graph, username: &str, friend: &str) -> AppResult<()> {
    let a = graph.account_key(username)?;
    let b = graph.account_key(friend)?;
    graph.add_friends(a, b)?;
    tracing::info!(account = username, friend, "Friend link added");
    Ok(())
}

/// Snapshot of an account suitable for saving and later re-import
pub fn export_profile(graph: &Graph, username: &str) -> AppResult<ProfileRecord> {
    let account = graph.account(graph.account_key(username)?);
    Ok(ProfileRecord {
        username: account.username.clone(),
        favorites: account
            .favorites
            .iter()
            .map(|key| graph.item(*key).id)
            .collect(),
        friends: account
            .friends()
            .iter()
            .map(|key| graph.account(*key).username.clone())
            .collect(),
        favorite_era: account.favorite_era,
        priorities: account.priorities.base,
        reviews: account
            .reviews()
            .iter()
            .map(|(item, review)| ProfileReview {
                item: graph.item(*item).id,
                ratings: graph.review(*review).ratings,
            })
            .collect(),
    })
}

/// Rebuilds an account from a saved profile.
///
/// Every reference in the record is resolved before the graph is touched, so
/// a rejected record leaves the graph unchanged.
pub fn import_profile(graph: &mut Graph, record: ProfileRecord) -> AppResult<AccountKey> {
    if graph.contains_account(&record.username) {
        return Err(AppError::InvalidInput(format!(
            "account '{}' already exists",
            record.username
        )));
    }
    record.priorities.validate()?;
    if record.priorities.total() == 0 {
        return Err(AppError::ZeroPriorityMass(record.username));
    }
    record.favorite_era.validate()?;

    let favorites = record
        .favorites
        .iter()
        .map(|id| graph.item_key(*id))
        .collect::<AppResult<Vec<_>>>()?;
    let friends = record
        .friends
        .iter()
        .map(|name| graph.account_key(name))
        .collect::<AppResult<Vec<_>>>()?;

    let mut reviewed = HashSet::new();
    let mut reviews = Vec::with_capacity(record.reviews.len());
    for review in &record.reviews {
        review.ratings.validate()?;
        let item = graph.item_key(review.item)?;
        if !reviewed.insert(item) {
            return Err(AppError::AlreadyLinked {
                username: record.username.clone(),
                item: review.item,
            });
        }
        reviews.push((item, review.ratings));
    }

    let liked = reviews
        .iter()
        .any(|(_, ratings)| ratings.overall > LIKED_OVERALL_THRESHOLD);
    if favorites.is_empty() && !liked {
        return Err(AppError::EmptyPreferenceSource(record.username));
    }

    let account = Account::new(record.username.as_str(), favorites)
        .with_priorities(record.priorities)
        .with_favorite_era(record.favorite_era);
    let key = graph.insert_account(account)?;
    for (item, ratings) in reviews {
        graph.add_review(key, item, ratings)?;
    }
    for friend in friends {
        graph.add_friends(key, friend)?;
    }
    recalibrate(graph, key)?;

    tracing::info!(
        account = %record.username,
        reviews = record.reviews.len(),
        friends = record.friends.len(),
        "Profile imported"
    );
    Ok(key)
}

/// Recalibrates when the account has anything to learn from, otherwise only
/// rederives weights
fn refresh(graph: &mut Graph, key: AccountKey) -> AppResult<()> {
    if preference_source(graph, key).is_empty() {
        return derive_weights(graph, key);
    }
    recalibrate(graph, key)
}
