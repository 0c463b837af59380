//! API integration tests
//!
//! Expect a running server with a librarian account admin/admin, e.g.
//! CATALOG_AUTH__BOOTSTRAP_LOGIN=admin CATALOG_AUTH__BOOTSTRAP_PASSWORD=admin

use chrono::{Duration, Local};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get a librarian token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// 13-digit ISBN unlikely to collide across runs
fn unique_isbn() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{:013}", nanos % 10_000_000_000_000)
}

async fn create_json(client: &Client, token: &str, path: &str, body: Value) -> Value {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", path);
    response.json().await.expect("Failed to parse response")
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_lists_permissions() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["login"], "admin");
    assert_eq!(body["permissions"], json!(["can_mark_returned"]));
}

#[tokio::test]
#[ignore]
async fn test_index_counts_visits_per_session() {
    let client = Client::builder().cookie_store(true).build().unwrap();

    let first: Value = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(first["num_visits"], 1);
    assert!(first["num_books"].is_number());

    let second: Value = client
        .get(format!("{}/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(second["num_visits"], 2);
}

#[tokio::test]
#[ignore]
async fn test_anonymous_cannot_create_books() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Anonymous",
            "isbn": unique_isbn()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_deleting_author_keeps_book() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let author = create_json(
        &client,
        &token,
        "/authors",
        json!({ "first_name": "Ursula", "last_name": "Le Guin" }),
    )
    .await;
    let author_id = author["id"].as_i64().unwrap();

    let book = create_json(
        &client,
        &token,
        "/books",
        json!({
            "title": "The Dispossessed",
            "summary": "An ambiguous utopia.",
            "isbn": unique_isbn(),
            "author_id": author_id
        }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .delete(format!("{}/authors/{}", BASE_URL, author_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let details: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(details["title"], "The Dispossessed");
    assert!(details["author_id"].is_null());
    assert!(details["author"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_deleting_book_keeps_its_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book = create_json(
        &client,
        &token,
        "/books",
        json!({ "title": "Roadside Picnic", "isbn": unique_isbn() }),
    )
    .await;
    let book_id = book["id"].as_i64().unwrap();

    let instance = create_json(
        &client,
        &token,
        "/book-instances",
        json!({ "book_id": book_id, "imprint": "Macmillan, 1977", "status": "available" }),
    )
    .await;
    let instance_id = instance["id"].as_str().unwrap().to_string();

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored: Value = client
        .get(format!("{}/book-instances/{}", BASE_URL, instance_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(stored["imprint"], "Macmillan, 1977");
    assert!(stored["book_id"].is_null());
    assert!(stored["book_title"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_book_list_reports_applied_page_window() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books?page={}&per_page=1000", BASE_URL, i64::MAX))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["page"], i64::MAX);
    assert_eq!(body["per_page"], 200);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
#[ignore]
async fn test_renewal_flow() {
    let client = Client::builder().redirect(Policy::none()).build().unwrap();
    let token = get_auth_token(&client).await;
    let today = Local::now().date_naive();

    let book = create_json(
        &client,
        &token,
        "/books",
        json!({ "title": "Solaris", "isbn": unique_isbn() }),
    )
    .await;

    let instance = create_json(
        &client,
        &token,
        "/book-instances",
        json!({
            "book_id": book["id"],
            "imprint": "Faber, 2003",
            "due_back": today.to_string(),
            "status": "on_loan"
        }),
    )
    .await;
    let id = instance["id"].as_str().unwrap().to_string();
    let renew_url = format!("{}/book-instances/{}/renew", BASE_URL, id);

    let form: Value = client
        .get(&renew_url)
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(form["renewal_date"], (today + Duration::weeks(3)).to_string());

    let response = client
        .post(&renew_url)
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": (today - Duration::days(1)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"]["message"], "Invalid date - renewal in past");

    let response = client
        .post(&renew_url)
        .bearer_auth(&token)
        .json(&json!({ "renewal_date": (today + Duration::weeks(5)).to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let renewed = today + Duration::weeks(4);
    let response = client
        .post(&renew_url)
        .bearer_auth(&token)
        .json(&json!({ "due_back": renewed.to_string() }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/api/v1/borrowed");

    let stored: Value = client
        .get(format!("{}/book-instances/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(stored["due_back"], renewed.to_string());
    assert_eq!(stored["is_overdue"], false);
}
