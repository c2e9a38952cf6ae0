use super::{AccountKey, ItemKey, Ratings};

/// An edge between one account and one item, carrying the account's ratings.
///
/// Reviews live in the graph's edge arena and are referenced by key from both
/// endpoints. They are never updated or removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Review {
    pub account: AccountKey,
    pub item: ItemKey,
    pub ratings: Ratings,
}
