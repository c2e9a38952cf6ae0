use serde::{Deserialize, Serialize};

use super::{BasePriorities, DateRange, ItemId, Ratings};

// ============================================================================
// Catalog ingestion records
// ============================================================================

/// One catalog entry as produced by the bulk loader
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub id: ItemId,
    pub title: String,
    pub genres: Vec<String>,
    pub aired: DateRange,
    pub episodes: u32,
}

/// An account with its favorite item ids
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub username: String,
    #[serde(default)]
    pub favorites: Vec<ItemId>,
}

/// A review linking an account to an item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRecord {
    pub username: String,
    pub item: ItemId,
    pub ratings: Ratings,
}

/// Full catalog document; each section is applied in order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
}

// ============================================================================
// Profile exchange record
// ============================================================================

/// A review as stored in a saved profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileReview {
    pub item: ItemId,
    pub ratings: Ratings,
}

/// Portable snapshot of one account, written on save and read on import
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub username: String,
    pub favorites: Vec<ItemId>,
    pub friends: Vec<String>,
    pub favorite_era: DateRange,
    pub priorities: BasePriorities,
    pub reviews: Vec<ProfileReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sections_default_to_empty() {
        let catalog: Catalog = serde_json::from_str("{}").unwrap();
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn test_profile_record_json_shape() {
        let json = r#"{
            "username": "alan",
            "favorites": [1535],
            "friends": ["beth"],
            "favorite_era": {"start": "2005-01-01", "end": "2010-12-31"},
            "priorities": {"story": 9, "animation": 4, "sound": 3, "character": 7},
            "reviews": [
                {"item": 5114, "ratings": {"story": 10, "animation": 9, "sound": 9,
                 "character": 10, "enjoyment": 10, "overall": 10}}
            ]
        }"#;

        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.favorites, vec![ItemId(1535)]);
        assert_eq!(record.priorities.story, 9);
        assert_eq!(record.reviews[0].ratings.overall, 10);
        assert_eq!(record.favorite_era.start.to_string(), "2005-01-01");
    }
}
