mod common;

use axum::http::StatusCode;
use common::{body_string, TestApp};
use serde_json::json;

#[tokio::test]
async fn export_returns_grouped_lists() {
    let app = TestApp::new().await;
    app.toggle("u1", "watchlist", "tt0111161").await;
    app.toggle("u1", "watched", "tt0068646").await;
    let list_id = app.create_list("u1", "Oscars").await;
    app.mutate(json!({
        "action": "ADD_TO_CUSTOM_LIST",
        "userId": "u1",
        "listId": list_id,
        "movie": { "imdb_id": "tt0071562" },
    }))
    .await;
    app.create_list("u1", "Empty").await;

    let resp = app.get("/lists/export?userId=u1").await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Check Content-Disposition header
    let content_disposition = resp
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_disposition.starts_with("attachment; filename="));
    assert!(content_disposition.contains("reelbox-export-"));

    // Check JSON content
    let body = body_string(resp).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert!(json["exported_at"].is_string());
    assert_eq!(json["user_id"], "u1");
    assert_eq!(json["standard_lists"]["watchlist"][0]["imdb_id"], "tt0111161");
    assert_eq!(json["standard_lists"]["watched"][0]["imdb_id"], "tt0068646");
    assert_eq!(json["standard_lists"]["favourites"], json!([]));

    let custom = json["custom_lists"].as_array().unwrap();
    assert_eq!(custom.len(), 2);
    let oscars = custom.iter().find(|l| l["name"] == "Oscars").unwrap();
    assert_eq!(oscars["id"], list_id.as_str());
    assert_eq!(oscars["movies"][0]["title"], "The Godfather Part II");
    let empty = custom.iter().find(|l| l["name"] == "Empty").unwrap();
    assert_eq!(empty["movies"], json!([]));
}

#[tokio::test]
async fn export_without_user_is_bad_request() {
    let app = TestApp::new().await;
    let resp = app.get("/lists/export").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
