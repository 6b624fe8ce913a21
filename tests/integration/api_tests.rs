//! API integration tests

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Seeded `admin` user
const USER_ID: i64 = 1;

/// ISBN-shaped string (17 characters) unique to this run
fn unique_isbn() -> String {
    let n = Utc::now().timestamp_nanos_opt().unwrap_or_default().unsigned_abs() % 1_000_000_000;
    format!("978-0-{:09}-0", n)
}

/// Helper to create an available book and return its JSON
async fn create_book(client: &Client, title: &str, year: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Frank Herbert",
            "ISBN": unique_isbn(),
            "year": year
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
}

async fn get_book(client: &Client, id: i64) -> Value {
    client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn reserve(client: &Client, book_id: i64, due_time: chrono::DateTime<Utc>) -> reqwest::Response {
    client
        .post(format!("{}/reservations", BASE_URL))
        .json(&json!({
            "book": book_id,
            "user": USER_ID,
            "due_time": due_time
        }))
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_reserve_and_return_dune() {
    let client = Client::new();
    let book = create_book(&client, "Dune", 1965).await;
    let book_id = book["id"].as_i64().unwrap();
    assert_eq!(book["availability"], true);

    let response = reserve(&client, book_id, Utc::now() + Duration::days(7)).await;
    assert_eq!(response.status(), 201);
    let reservation: Value = response.json().await.unwrap();
    assert_eq!(reservation["status"], "active");
    assert_eq!(reservation["is_overdue"], false);
    assert_eq!(get_book(&client, book_id).await["availability"], false);

    // Book is held
    let response = reserve(&client, book_id, Utc::now() + Duration::days(7)).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["book"].is_array());

    let id = reservation["id"].as_i64().unwrap();
    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let returned: Value = response.json().await.unwrap();
    assert_eq!(returned["status"], "completed");
    assert!(returned["return_time"].is_string());
    assert_eq!(get_book(&client, book_id).await["availability"], true);

    let response = client
        .post(format!("{}/reservations/{}/return", BASE_URL, id))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "This book has already been returned.");
}

#[tokio::test]
#[ignore]
async fn test_past_due_time_is_rejected() {
    let client = Client::new();
    let book = create_book(&client, "Children of Dune", 1976).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = reserve(&client, book_id, Utc::now() - Duration::hours(1)).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["due_time"].is_array());
    assert_eq!(get_book(&client, book_id).await["availability"], true);
}

#[tokio::test]
#[ignore]
async fn test_overdue_filter_only_lists_overdue() {
    let client = Client::new();
    let book = create_book(&client, "Dune Messiah", 1969).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = reserve(&client, book_id, Utc::now() + Duration::days(3)).await;
    let reservation: Value = response.json().await.unwrap();
    let id = reservation["id"].as_i64().unwrap();

    let listed: Vec<Value> = client
        .get(format!("{}/reservations?overdue=true", BASE_URL))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.iter().all(|r| r["is_overdue"] == true));
    assert!(listed.iter().all(|r| r["id"].as_i64() != Some(id)));

    client
        .delete(format!("{}/reservations/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(get_book(&client, book_id).await["availability"], true);
}

#[tokio::test]
#[ignore]
async fn test_rebook_moves_availability() {
    let client = Client::new();
    let first = create_book(&client, "Chapterhouse: Dune", 1985).await;
    let second = create_book(&client, "The Dosadi Experiment", 1977).await;
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let response = reserve(&client, first_id, Utc::now() + Duration::days(5)).await;
    let reservation: Value = response.json().await.unwrap();
    let id = reservation["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/reservations/{}", BASE_URL, id))
        .json(&json!({ "book": second_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let moved: Value = response.json().await.unwrap();
    assert_eq!(moved["book"], second_id);
    assert_eq!(get_book(&client, first_id).await["availability"], true);
    assert_eq!(get_book(&client, second_id).await["availability"], false);

    let response = client
        .delete(format!("{}/reservations/{}", BASE_URL, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert_eq!(get_book(&client, second_id).await["availability"], true);
}

#[tokio::test]
#[ignore]
async fn test_book_category_by_name() {
    let client = Client::new();
    let name = format!("category-{}", unique_isbn());

    let response = client
        .post(format!("{}/categories", BASE_URL))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let category: Value = response.json().await.unwrap();

    let book = create_book(&client, "God Emperor of Dune", 1981).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/books/{}/categories/{}", BASE_URL, book_id, name))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let linked: Value = response.json().await.unwrap();
    assert_eq!(linked["categories"], json!([category["id"]]));

    let response = client
        .delete(format!("{}/books/{}/categories/{}", BASE_URL, book_id, name))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert_eq!(get_book(&client, book_id).await["categories"], json!([]));

    let response = client
        .post(format!("{}/books/{}/categories/{}", BASE_URL, book_id, "no-such-category"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_review_is_rejected() {
    let client = Client::new();
    let book = create_book(&client, "Heretics of Dune", 1984).await;
    let book_id = book["id"].as_i64().unwrap();

    let review = json!({
        "rating": 5,
        "content": "Sprawling and strange, in the best way.",
        "book": book_id,
        "user": USER_ID
    });

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/reviews", BASE_URL))
        .json(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["non_field_errors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_unknown_ordering_is_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?ordering=price", BASE_URL))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}
