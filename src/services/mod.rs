pub mod calibration;
pub mod catalog;
pub mod paths;
pub mod profiles;
pub mod recommendations;
pub mod similarity;
pub mod tags;
pub mod title_search;

pub use catalog::{load_graph, CatalogSource, JsonFileSource};
pub use profiles::RatingInput;
pub use recommendations::{RecommendOptions, Recommendation};
pub use title_search::SearchHit;
