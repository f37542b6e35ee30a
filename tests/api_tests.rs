//! API integration tests
//!
//! These run against a live server on localhost:8080 with a clean database
//! plus two seeded accounts:
//!   admin@librarium.local / admin123  (role: admin)
//!   owner@librarium.local / owner123  (role: owner)
//!
//! Run with: cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api";

/// Register a fresh user and return (email, token)
async fn register_and_login(client: &Client) -> (String, String) {
    let email = format!("user-{}@example.com", Uuid::new_v4());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let token = login(client, &email, "password123").await;
    (email, token)
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    login(client, "admin@librarium.local", "admin123").await
}

async fn owner_token(client: &Client) -> String {
    login(client, "owner@librarium.local", "owner123").await
}

/// Create a book as admin and return its ID
async fn create_book(client: &Client, token: &str) -> String {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "The Test Book",
            "author": "A. Author",
            "category": "Fiction"
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["bookId"].as_str().expect("No bookId in response").to_string()
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

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_register_duplicate_email_conflict() {
    let client = Client::new();
    let (email, _) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Someone Else",
            "email": email.to_uppercase(),
            "password": "password456"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (email, _) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let (email, token) = register_and_login(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["email"], email.to_lowercase());
    assert_eq!(body["user"]["isAdmin"], false);
}

#[tokio::test]
#[ignore]
async fn test_list_books_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_create_book_forbidden_for_regular_user() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Nope",
            "author": "Nope",
            "category": "Nope"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_missing_fields() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Only a title"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_without_email_or_session_unauthorized() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Walk In",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    // Borrow with an explicit borrower email, no session needed
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Walk In",
            "userEmail": "walkin@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["borrowId"].as_str().expect("No borrowId").to_string();
    assert!(body["dueDate"].is_string());

    // Same borrower asks again
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Walk In",
            "userEmail": "WALKIN@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("already borrowed by you"));

    // A different borrower is also refused while the book is out
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Other Person",
            "userEmail": "other@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);

    // Availability probe reports the active holder
    let response = client
        .get(format!("{}/books/borrow?bookId={}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed"], true);
    assert_eq!(body["by"]["email"], "walkin@example.com");

    // Return the book
    let response = client
        .post(format!("{}/books/return/{}", BASE_URL, borrow_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["returnDate"].is_string());

    // Returning twice is an invalid state
    let response = client
        .post(format!("{}/books/return/{}", BASE_URL, borrow_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 400);

    // The book can be borrowed again once returned
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Other Person",
            "userEmail": "other@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_borrow_uses_session_email() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let (email, token) = register_and_login(&client).await;

    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Session User",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let response = client
        .get(format!("{}/books/borrow?bookId={}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["by"]["email"], email.to_lowercase());
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book_not_found() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": Uuid::new_v4().to_string(),
            "bookTitle": "Ghost",
            "bookAuthor": "Nobody",
            "userName": "Walk In",
            "userEmail": "walkin@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_list_borrowed_books() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/borrow", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["borrowedBooks"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_list_users_forbidden_for_regular_user() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_list_users_as_admin() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["users"].is_array());
    assert!(body["stats"]["total"].is_number());
    assert!(body["stats"]["regularUsers"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_change_role_requires_owner() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/owner/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": Uuid::new_v4().to_string(),
            "role": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_owner_promotes_and_demotes_user() {
    let client = Client::new();
    let owner = owner_token(&client).await;
    let (email, user_token) = register_and_login(&client).await;

    // Find the new user's ID through the directory
    let admin = admin_token(&client).await;
    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let user_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == email.to_lowercase())
        .expect("Registered user not in directory")["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Promote to admin
    let response = client
        .post(format!("{}/owner/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "userId": user_id, "role": "admin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Roles are read from the token, so the old session keeps its old role
    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // A fresh login reflects the new role
    let fresh = login(&client, &email, "password123").await;
    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", fresh))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Demote back
    let response = client
        .post(format!("{}/owner/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "userId": user_id, "role": "user" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_owner_accounts_cannot_be_reassigned() {
    let client = Client::new();
    let owner = owner_token(&client).await;

    // Find the owner's own ID
    let response = client
        .get(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let owner_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["role"] == "owner")
        .expect("No owner in directory")["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Targeting an owner is refused
    let response = client
        .post(format!("{}/owner/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "userId": owner_id, "role": "admin" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // Nor can anyone be assigned the owner role
    let response = client
        .post(format!("{}/owner/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", owner))
        .json(&json!({ "userId": owner_id, "role": "owner" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_analytics_as_admin() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .get(format!("{}/analytics", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["overview"]["totalBooks"].is_number());
    assert!(body["data"]["categoryStats"].is_array());
    assert!(body["data"]["monthlyStats"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_owner_stats() {
    let client = Client::new();
    let token = owner_token(&client).await;

    let response = client
        .get(format!("{}/owner/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["stats"]["totalUsers"].is_number());
    assert!(body["stats"]["totalBorrows"].is_number());
}

/// Fetch a single book from the catalog listing
async fn get_book(client: &Client, token: &str, book_id: &str) -> Value {
    let response = client
        .get(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == book_id)
        .expect("Book not in catalog")
        .clone()
}

/// Find a borrow record in the unfiltered listing
fn find_record<'a>(body: &'a Value, borrow_id: &str) -> &'a Value {
    body["borrowedBooks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == borrow_id)
        .expect("Borrow record not in listing")
}

#[tokio::test]
#[ignore]
async fn test_listing_commits_overdue_transition() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    // Borrow with a due date already in the past
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Late Borrower",
            "userEmail": "late@example.com",
            "borrowDate": (Utc::now() - Duration::days(30)).to_rfc3339(),
            "dueDate": (Utc::now() - Duration::days(16)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let borrow_id = body["borrowId"].as_str().expect("No borrowId").to_string();

    // The unfiltered listing reports the record as overdue and stores it
    let response = client
        .get(format!("{}/books/borrow", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(find_record(&body, &borrow_id)["status"], "overdue");

    // A second listing sees the stored status; once overdue, always overdue
    let response = client
        .get(format!("{}/books/borrow", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(find_record(&body, &borrow_id)["status"], "overdue");

    // An overdue loan still blocks other borrowers
    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Other Person",
            "userEmail": "other@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_increments_borrow_count() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let before = get_book(&client, &admin, &book_id).await["borrowCount"]
        .as_i64()
        .expect("No borrowCount");

    let response = client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({
            "bookId": book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Counter Check",
            "userEmail": "counter@example.com",
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let after = get_book(&client, &admin, &book_id).await["borrowCount"]
        .as_i64()
        .expect("No borrowCount");
    assert_eq!(after, before + 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_admit_one_winner() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;

    let borrow = |email: &str| {
        let client = client.clone();
        let body = json!({
            "bookId": &book_id,
            "bookTitle": "The Test Book",
            "bookAuthor": "A. Author",
            "userName": "Racer",
            "userEmail": email,
            "borrowDate": Utc::now().to_rfc3339(),
            "dueDate": (Utc::now() + Duration::days(14)).to_rfc3339()
        });
        async move {
            client
                .post(format!("{}/books/borrow", BASE_URL))
                .json(&body)
                .send()
                .await
                .expect("Failed to send borrow request")
                .status()
        }
    };

    // Two requests in flight at once. Even when both pass the pre-insert
    // availability check, the unique index on active loans lets only one
    // insert through; the loser gets a 409, never a second active loan.
    let (first, second) = tokio::join!(
        borrow("racer-one@example.com"),
        borrow("racer-two@example.com")
    );

    let statuses = [first.as_u16(), second.as_u16()];
    assert!(statuses.contains(&201), "no borrow succeeded: {:?}", statuses);
    assert!(statuses.contains(&409), "both borrows succeeded: {:?}", statuses);

    // Exactly one active holder remains
    let response = client
        .get(format!("{}/books/borrow?bookId={}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrowed"], true);
}
