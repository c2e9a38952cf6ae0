use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use anirec_api::api::{create_router, AppState};
use anirec_api::models::{Catalog, Graph};
use anirec_api::services::RecommendOptions;

fn ratings(value: u8) -> Value {
    json!({
        "story": value,
        "animation": value,
        "sound": value,
        "character": value,
        "enjoyment": value,
        "overall": value
    })
}

fn item(id: u64, title: &str, episodes: u32, genres: &[&str], start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "episodes": episodes,
        "genres": genres,
        "aired": { "start": start, "end": end }
    })
}

fn test_catalog() -> Catalog {
    serde_json::from_value(json!({
        "items": [
            item(1, "Cowboy Bebop", 26, &["Action", "SciFi"], "1998-04-03", "1999-04-24"),
            item(2, "Samurai Champloo", 26, &["Action", "Adventure"], "2004-05-20", "2005-03-19"),
            item(3, "Mushishi", 26, &["Adventure", "Mystery"], "2005-10-23", "2006-06-19"),
            item(4, "Planetes", 26, &["SciFi", "Drama"], "2003-10-04", "2004-04-17"),
            item(5, "Space Dandy", 13, &["SciFi", "Comedy"], "2014-01-05", "2014-03-27")
        ],
        "accounts": [
            { "username": "alan", "favorites": [1] },
            { "username": "beth", "favorites": [2] },
            { "username": "cara" }
        ],
        "reviews": [
            { "username": "alan", "item": 1, "ratings": ratings(8) },
            { "username": "beth", "item": 1, "ratings": ratings(9) },
            { "username": "beth", "item": 4, "ratings": ratings(8) },
            { "username": "cara", "item": 4, "ratings": ratings(7) },
            { "username": "cara", "item": 5, "ratings": ratings(9) }
        ]
    }))
    .unwrap()
}

fn create_test_server() -> TestServer {
    let graph = Graph::from_catalog(test_catalog()).unwrap();
    let state = AppState::new(graph, RecommendOptions::default());
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["items"], 5);
    assert_eq!(body["reviews"], 5);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let id = "5f0c6a52-3f55-4a8e-9d43-1c0a8f3b7e21";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_search_items() {
    let server = create_test_server();

    let response = server
        .get("/items/search")
        .add_query_param("q", "Cowboy Bebop")
        .await;

    response.assert_status_ok();
    let hits: Vec<Value> = response.json();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["label"], "Cowboy Bebop, 1");
    assert_eq!(hits[0]["item_id"], 1);
    assert_eq!(hits[0]["score"], 1.0);
}

#[tokio::test]
async fn test_search_with_only_stop_words_is_rejected() {
    let server = create_test_server();

    let response = server
        .get("/items/search")
        .add_query_param("q", "the of and")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_get_item() {
    let server = create_test_server();

    let response = server.get("/items/1").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["title"], "Cowboy Bebop");
    assert_eq!(body["reviewers"], 2);
    assert_eq!(body["average_ratings"]["story"], 8.5);

    server
        .get("/items/999")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_account() {
    let server = create_test_server();

    let response = server
        .post("/accounts")
        .json(&json!({ "username": "dana", "favorites": [2, 3] }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["username"], "dana");
    assert_eq!(created["priorities"]["story"], 1);
    assert_eq!(created["priorities"]["episodes"], 26);
    assert_eq!(created["weights"]["sound"], 0.25);
    assert_eq!(created["favorite_era"]["start"], "1961-01-01");

    // same username again
    server
        .post("/accounts")
        .json(&json!({ "username": "dana", "favorites": [1] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_account_without_favorites() {
    let server = create_test_server();

    server
        .post("/accounts")
        .json(&json!({ "username": "dana", "favorites": [] }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    server
        .post("/accounts")
        .json(&json!({ "username": "dana", "favorites": [42] }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_review_derives_overall() {
    let server = create_test_server();

    let response = server
        .post("/accounts/alan/reviews")
        .json(&json!({
            "item_id": 3,
            "ratings": {
                "story": 9,
                "animation": 8,
                "sound": 7,
                "character": 9,
                "enjoyment": 10
            }
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["ratings"]["overall"], 8);

    // second review of the same item
    server
        .post("/accounts/alan/reviews")
        .json(&json!({ "item_id": 3, "ratings": ratings(5) }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_preferences() {
    let server = create_test_server();

    let response = server
        .put("/accounts/alan/preferences")
        .json(&json!({
            "priorities": { "story": 5, "animation": 0, "sound": 0, "character": 5 },
            "favorite_era": { "start": "1995-01-01", "end": "2005-01-01" }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["weights"]["story"], 0.5);
    assert_eq!(body["weights"]["animation"], 0.0);
    assert_eq!(body["favorite_era"]["end"], "2005-01-01");
}

#[tokio::test]
async fn test_zero_priorities_rejected() {
    let server = create_test_server();

    server
        .put("/accounts/alan/preferences")
        .json(&json!({
            "priorities": { "story": 0, "animation": 0, "sound": 0, "character": 0 }
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let profile: Value = server.get("/accounts/alan/profile").await.json();
    assert_eq!(profile["priorities"]["story"], 1);
}

#[tokio::test]
async fn test_path_recommendations() {
    let server = create_test_server();

    let response = server.get("/accounts/alan/recommendations").await;
    response.assert_status_ok();

    let recs: Vec<Value> = response.json();
    let ids: Vec<u64> = recs.iter().map(|r| r["item_id"].as_u64().unwrap()).collect();
    // alan -> Cowboy Bebop -> beth -> Planetes
    assert_eq!(ids, vec![4]);
    assert_eq!(recs[0]["title"], "Planetes");

    server
        .get("/accounts/nobody/recommendations")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_friend_recommendations() {
    let server = create_test_server();

    let empty: Vec<Value> = server
        .get("/accounts/alan/recommendations/friends")
        .await
        .json();
    assert!(empty.is_empty());

    let response = server
        .post("/accounts/alan/friends")
        .json(&json!({ "friend": "beth" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["friends"], json!(["beth"]));

    let recs: Vec<Value> = server
        .get("/accounts/alan/recommendations/friends")
        .add_query_param("limit", 5)
        .await
        .json();
    let mut ids: Vec<u64> = recs.iter().map(|r| r["item_id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test]
async fn test_self_friendship_rejected() {
    let server = create_test_server();

    server
        .post("/accounts/alan/friends")
        .json(&json!({ "friend": "alan" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_and_import_profile() {
    let server = create_test_server();

    let mut profile: Value = server.get("/accounts/alan/profile").await.json();
    assert_eq!(profile["favorites"], json!([1]));
    assert_eq!(profile["reviews"][0]["item"], 1);

    profile["username"] = json!("alan_copy");
    let response = server.post("/accounts/import").json(&profile).await;
    response.assert_status(StatusCode::CREATED);

    let copy: Value = server.get("/accounts/alan_copy/profile").await.json();
    assert_eq!(copy["reviews"], profile["reviews"]);
    assert_eq!(copy["favorite_era"], profile["favorite_era"]);

    // "alan" is still taken
    profile["username"] = json!("alan");
    server
        .post("/accounts/import")
        .json(&profile)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_similarity_breakdown() {
    let server = create_test_server();

    let response = server.get("/accounts/alan/similarity/4").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let similarity = &body["similarity"];
    // alan's affinity is {Action, SciFi}; Planetes is {SciFi, Drama}
    assert_eq!(similarity["genre_match"], 0.33);
    assert_eq!(similarity["episode_score"], 1.0);
}
