//! Catalog ingestion
//!
//! The bulk loader hands over plain records; this module turns them into a
//! populated [`Graph`]. Where the records come from is abstracted behind
//! [`CatalogSource`] so the binary can read a JSON file while tests feed
//! records directly.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::calibration::{derive_weights, preference_source, recalibrate};
use crate::{
    error::{AppError, AppResult},
    models::{Account, Catalog, Graph, Item},
};

/// Supplier of catalog records
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the full catalog
    async fn load(&self) -> AppResult<Catalog>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Reads a catalog serialized as one JSON document
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> AppResult<Catalog> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::Catalog(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}

impl Graph {
    /// Builds a graph from catalog records.
    ///
    /// Sections are applied in order: items, accounts, reviews. Any unresolved
    /// reference rejects the whole catalog. Accounts with favorites or
    /// well-rated reviews are calibrated once all reviews are in; the rest
    /// only get weights.
    pub fn from_catalog(catalog: Catalog) -> AppResult<Self> {
        let mut graph = Graph::new();

        for record in catalog.items {
            let item = Item::new(
                record.id,
                record.title,
                record.episodes,
                record.genres,
                record.aired,
            )?;
            graph.insert_item(item)?;
        }

        for record in catalog.accounts {
            let favorites = record
                .favorites
                .iter()
                .map(|id| graph.item_key(*id))
                .collect::<AppResult<Vec<_>>>()?;
            graph.insert_account(Account::new(record.username, favorites))?;
        }

        for record in catalog.reviews {
            record.ratings.validate()?;
            let account = graph.account_key(&record.username)?;
            let item = graph.item_key(record.item)?;
            graph.add_review(account, item, record.ratings)?;
        }

        let keys: Vec<_> = graph.accounts().map(|(key, _)| key).collect();
        let mut uncalibrated = 0usize;
        for key in keys {
            if preference_source(&graph, key).is_empty() {
                tracing::debug!(
                    account = %graph.account(key).username,
                    "Account has no preference source, deriving weights only"
                );
                uncalibrated += 1;
                derive_weights(&mut graph, key)?;
                continue;
            }
            recalibrate(&mut graph, key)?;
        }

        tracing::info!(
            items = graph.item_count(),
            accounts = graph.account_count(),
            reviews = graph.review_count(),
            uncalibrated,
            "Graph built from catalog"
        );
        Ok(graph)
    }
}

/// Loads records from `source` and builds the graph
pub async fn load_graph(source: &dyn CatalogSource) -> AppResult<Graph> {
    let start = Instant::now();
    let catalog = source.load().await?;

    tracing::info!(
        source = source.name(),
        items = catalog.items.len(),
        accounts = catalog.accounts.len(),
        reviews = catalog.reviews.len(),
        "Catalog loaded"
    );

    let graph = Graph::from_catalog(catalog)?;
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Catalog ingestion completed"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountRecord, DateRange, ItemId, ItemRecord, Ratings, ReviewRecord,
    };
    use chrono::NaiveDate;
    use std::io::Write;

    fn item_record(id: u64, title: &str, genres: &[&str]) -> ItemRecord {
        ItemRecord {
            id: ItemId(id),
            title: title.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            aired: DateRange::new(
                NaiveDate::from_ymd_opt(2009, 4, 5).unwrap(),
                NaiveDate::from_ymd_opt(2010, 7, 4).unwrap(),
            )
            .unwrap(),
            episodes: 64,
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog {
            items: vec![
                item_record(5114, "Fullmetal Alchemist: Brotherhood", &["Action", "Adventure"]),
                item_record(9253, "Steins;Gate", &["SciFi", "Thriller"]),
            ],
            accounts: vec![
                AccountRecord {
                    username: "alan".to_string(),
                    favorites: vec![ItemId(5114)],
                },
                AccountRecord {
                    username: "beth".to_string(),
                    favorites: vec![],
                },
            ],
            reviews: vec![ReviewRecord {
                username: "beth".to_string(),
                item: ItemId(9253),
                ratings: Ratings {
                    story: 9,
                    animation: 8,
                    sound: 8,
                    character: 9,
                    enjoyment: 10,
                    overall: 9,
                },
            }],
        }
    }

    #[test]
    fn test_from_catalog_builds_and_calibrates() {
        let graph = Graph::from_catalog(sample_catalog()).unwrap();

        assert_eq!(graph.item_count(), 2);
        assert_eq!(graph.account_count(), 2);
        assert_eq!(graph.review_count(), 1);

        let beth = graph.account(graph.account_key("beth").unwrap());
        assert!(beth.affinity.contains("SciFi"));
        assert_eq!(beth.priorities.episodes, 64);
        assert!((beth.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_favorite_rejected() {
        let mut catalog = sample_catalog();
        catalog.accounts[0].favorites.push(ItemId(1));
        assert!(matches!(
            Graph::from_catalog(catalog),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_reviewer_rejected() {
        let mut catalog = sample_catalog();
        catalog.reviews[0].username = "ghost".to_string();
        assert!(matches!(
            Graph::from_catalog(catalog),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_review_rejected() {
        let mut catalog = sample_catalog();
        catalog.reviews.push(catalog.reviews[0].clone());
        assert!(matches!(
            Graph::from_catalog(catalog),
            Err(AppError::AlreadyLinked { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_graph_from_mock_source() {
        let mut source = MockCatalogSource::new();
        source.expect_load().times(1).returning(|| Ok(sample_catalog()));
        source.expect_name().return_const("mock");

        let graph = load_graph(&source).await.unwrap();
        assert_eq!(graph.item_count(), 2);
    }

    #[tokio::test]
    async fn test_load_graph_propagates_source_error() {
        let mut source = MockCatalogSource::new();
        source
            .expect_load()
            .returning(|| Err(AppError::Catalog("unreachable".to_string())));
        source.expect_name().return_const("mock");

        assert!(matches!(
            load_graph(&source).await,
            Err(AppError::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&sample_catalog()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let source = JsonFileSource::new(file.path());
        let catalog = source.load().await.unwrap();
        assert_eq!(catalog, sample_catalog());
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let source = JsonFileSource::new("/nonexistent/catalog.json");
        assert!(matches!(source.load().await, Err(AppError::Catalog(_))));
    }
}
