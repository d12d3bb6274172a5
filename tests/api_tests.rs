//! API integration tests.
//!
//! These run against a live server with a seeded database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const HEALTH_URL: &str = "http://localhost:8080/health";

/// Create a book with a unique title and return its JSON representation.
async fn create_test_book(client: &Client, copies: i32) -> Value {
    let title = format!(
        "Test Book {}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse book response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(HEALTH_URL)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_service_info() {
    let client = Client::new();

    let response = client
        .get(format!("{}/info", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["name"].is_string());
    assert!(body["environment"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].is_array());
    assert!(body["total"].is_number());
    // Every book carries its active-loan annotation
    for book in body["books"].as_array().unwrap() {
        assert!(book["active_loans"].is_number());
    }
}

#[tokio::test]
#[ignore]
async fn test_create_book_starts_fully_available() {
    let client = Client::new();

    let book = create_test_book(&client, 3).await;
    assert_eq!(book["total_copies"], 3);
    assert_eq!(book["available_copies"], 3);
    assert_eq!(book["active_loans"], 0);
}

#[tokio::test]
#[ignore]
async fn test_create_book_duplicate_title_conflicts() {
    let client = Client::new();

    let book = create_test_book(&client, 1).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": book["title"],
            "author": "Someone Else"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
#[ignore]
async fn test_create_book_empty_title_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "",
            "author": "Anonymous"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
#[ignore]
async fn test_get_missing_book_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/999999", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_update_book_partial_fields() {
    let client = Client::new();
    let book = create_test_book(&client, 2).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book["id"]))
        .json(&json!({ "author": "Updated Author" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["author"], "Updated Author");
    // Untouched fields keep their values
    assert_eq!(updated["title"], book["title"]);
    assert_eq!(updated["total_copies"], 2);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_round_trip() {
    let client = Client::new();
    let book = create_test_book(&client, 2).await;
    let book_id = book["id"].as_i64().unwrap();

    // Borrow one copy
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "book_id": book_id,
            "borrower_name": "Ana",
            "borrower_email": "ana@example.com"
        }))
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.expect("Failed to parse loan");
    assert_eq!(loan["returned"], false);
    assert!(loan["returned_date"].is_null());

    // Availability dropped by one
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available_copies"], 1);
    assert_eq!(book["active_loans"], 1);

    // Return it
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .send()
        .await
        .expect("Failed to send return request");

    assert!(response.status().is_success());
    let receipt: Value = response.json().await.expect("Failed to parse receipt");
    assert_eq!(receipt["loan"]["returned"], true);
    assert!(receipt["loan"]["returned_date"].is_string());
    assert_eq!(receipt["late_days"], 0);
    assert_eq!(receipt["fee"], 0);

    // Availability restored
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available_copies"], 2);
    assert_eq!(book["active_loans"], 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_exhausted_book_conflicts() {
    let client = Client::new();
    let book = create_test_book(&client, 1).await;
    let book_id = book["id"].as_i64().unwrap();

    let borrow = |email: &str| {
        client
            .post(format!("{}/loans", BASE_URL))
            .json(&json!({
                "book_id": book_id,
                "borrower_name": "Reader",
                "borrower_email": email
            }))
            .send()
    };

    let first = borrow("first@example.com").await.unwrap();
    assert_eq!(first.status(), 201);

    let second = borrow("second@example.com").await.unwrap();
    assert_eq!(second.status(), 409);

    // The failed borrow must not have mutated state
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available_copies"], 0);
    assert_eq!(book["active_loans"], 1);
}

#[tokio::test]
#[ignore]
async fn test_double_return_conflicts() {
    let client = Client::new();
    let book = create_test_book(&client, 1).await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "book_id": book["id"],
            "borrower_name": "Twice",
            "borrower_email": "twice@example.com"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let first = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());

    let second = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);

    // The rejected return must not change availability again
    let book: Value = client
        .get(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_cascades_to_loans() {
    let client = Client::new();
    let book = create_test_book(&client, 1).await;

    let loan: Value = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "book_id": book["id"],
            "borrower_name": "Gone",
            "borrower_email": "gone@example.com"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book["id"]))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // The loan went with its book
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrower_without_loans_not_found() {
    let client = Client::new();

    let response = client
        .get(format!(
            "{}/loans/borrower/nobody-here@example.com",
            BASE_URL
        ))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrower_loans_listed() {
    let client = Client::new();
    let book = create_test_book(&client, 1).await;
    let email = format!(
        "borrower-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );

    client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({
            "book_id": book["id"],
            "borrower_name": "Listed",
            "borrower_email": email
        }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/loans/borrower/{}", BASE_URL, email))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["borrower_email"], Value::String(email));
}

#[tokio::test]
#[ignore]
async fn test_active_loans_filter() {
    let client = Client::new();

    let response = client
        .get(format!("{}/loans?active=true", BASE_URL))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    for loan in body["loans"].as_array().unwrap() {
        assert_eq!(loan["returned"], false);
    }
}

#[tokio::test]
#[ignore]
async fn test_stats_shape_and_consistency() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let stats: Value = response.json().await.unwrap();

    let total = stats["total_copies"].as_i64().unwrap();
    let available = stats["available_copies"].as_i64().unwrap();
    let borrowed = stats["borrowed_copies"].as_i64().unwrap();
    assert_eq!(borrowed, total - available);
    assert!(stats["overdue_loans"].as_i64().unwrap() <= stats["active_loans"].as_i64().unwrap());
}
