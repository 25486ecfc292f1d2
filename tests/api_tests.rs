//! API integration tests
//!
//! These run against a live server with the seed data loaded:
//! start the server, create the admin account below, then
//! `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_EMAIL: &str = "admin@libris.org";
const ADMIN_PASSWORD: &str = "admin";

/// Helper to get a client with an authenticated staff session cookie
async fn staff_client() -> Client {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success(), "admin login failed");

    client
}

async fn create_reader(client: &Client, email: &str) -> i64 {
    let response = client
        .post(format!("{}/readers", BASE_URL))
        .json(&json!({
            "name": "Test Reader",
            "email": email,
            "type_id": 1
        }))
        .send()
        .await
        .expect("Failed to create reader");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No reader id")
}

async fn create_resource(client: &Client, title: &str) -> i64 {
    let response = client
        .post(format!("{}/resources", BASE_URL))
        .json(&json!({ "title": title, "type_id": 1 }))
        .send()
        .await
        .expect("Failed to create resource");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No resource id")
}

async fn create_loan(client: &Client, user_id: i64, resource_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/transactions", BASE_URL))
        .json(&json!({ "user_id": user_id, "resource_id": resource_id }))
        .send()
        .await
        .expect("Failed to send loan request")
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
async fn test_readiness_reports_database_connectivity() {
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": ADMIN_EMAIL,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_sets_session_cookie() {
    let client = staff_client().await;

    // The cookie alone must authenticate follow-up requests
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
#[ignore]
async fn test_requests_without_session_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/transactions", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrowed_resource_not_available_twice() {
    let client = staff_client().await;
    let reader_a = create_reader(&client, "double-a@test.org").await;
    let reader_b = create_reader(&client, "double-b@test.org").await;
    let resource = create_resource(&client, "Single Copy").await;

    let first = create_loan(&client, reader_a, resource).await;
    assert_eq!(first.status(), 201);

    // Same resource again, different reader: must be refused
    let second = create_loan(&client, reader_b, resource).await;
    assert_eq!(second.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_failed_reader_logins_are_counted() {
    let staff = staff_client().await;
    let response = staff
        .post(format!("{}/readers", BASE_URL))
        .json(&json!({
            "name": "Counter Reader",
            "email": "counter@test.org",
            "password": "right-password",
            "type_id": 1
        }))
        .send()
        .await
        .expect("Failed to create reader");
    let reader: Value = response.json().await.expect("Failed to parse response");
    let reader_id = reader["id"].as_i64().expect("No reader id");

    let client = Client::new();
    let response = client
        .post(format!("{}/reader-auth/login", BASE_URL))
        .json(&json!({ "email": "counter@test.org", "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send login");
    assert_eq!(response.status(), 401);

    let body: Value = staff
        .get(format!("{}/readers/{}", BASE_URL, reader_id))
        .send()
        .await
        .expect("Failed to fetch reader")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["failed_logins"], 1);

    // A successful login clears the counter
    let response = client
        .post(format!("{}/reader-auth/login", BASE_URL))
        .json(&json!({ "email": "counter@test.org", "password": "right-password" }))
        .send()
        .await
        .expect("Failed to send login");
    assert!(response.status().is_success());

    let body: Value = staff
        .get(format!("{}/readers/{}", BASE_URL, reader_id))
        .send()
        .await
        .expect("Failed to fetch reader")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["failed_logins"], 0);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_enforced() {
    let client = staff_client().await;
    // Guest type (id 3) allows a single active loan
    let response = client
        .post(format!("{}/readers", BASE_URL))
        .json(&json!({
            "name": "Guest Reader",
            "email": "guest-limit@test.org",
            "type_id": 3
        }))
        .send()
        .await
        .expect("Failed to create reader");
    let reader: Value = response.json().await.expect("Failed to parse response");
    let reader_id = reader["id"].as_i64().expect("No reader id");

    let first_resource = create_resource(&client, "Limit Test One").await;
    let second_resource = create_resource(&client, "Limit Test Two").await;

    let first = create_loan(&client, reader_id, first_resource).await;
    assert_eq!(first.status(), 201);

    let second = create_loan(&client, reader_id, second_resource).await;
    assert_eq!(second.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_creates_cannot_exceed_the_limit() {
    let client = staff_client().await;
    // Guest type (id 3) allows a single active loan
    let response = client
        .post(format!("{}/readers", BASE_URL))
        .json(&json!({
            "name": "Racing Reader",
            "email": "race-limit@test.org",
            "type_id": 3
        }))
        .send()
        .await
        .expect("Failed to create reader");
    let reader: Value = response.json().await.expect("Failed to parse response");
    let reader_id = reader["id"].as_i64().expect("No reader id");

    let first_resource = create_resource(&client, "Race Copy One").await;
    let second_resource = create_resource(&client, "Race Copy Two").await;

    // Fire both creates at once; the user-row lock serializes them
    let (first, second) = tokio::join!(
        create_loan(&client, reader_id, first_resource),
        create_loan(&client, reader_id, second_resource),
    );

    let statuses = [first.status().as_u16(), second.status().as_u16()];
    assert_eq!(
        statuses.iter().filter(|&&s| s == 201).count(),
        1,
        "exactly one create must win, got {:?}",
        statuses
    );
    assert!(statuses.contains(&422), "the loser must hit the limit");
}

#[tokio::test]
#[ignore]
async fn test_full_loan_lifecycle() {
    let client = staff_client().await;
    let reader = create_reader(&client, "lifecycle@test.org").await;
    let resource = create_resource(&client, "Lifecycle Test").await;

    let response = create_loan(&client, reader, resource).await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["reservation"]["id"].as_i64().expect("No reservation id");

    // Borrow -> Renew -> Renew2 -> Return
    for transition in ["renew", "renew2", "return"] {
        let response = client
            .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
            .json(&json!({ "type": transition }))
            .send()
            .await
            .expect("Failed to send transition");
        assert!(
            response.status().is_success(),
            "transition to {} failed",
            transition
        );
    }

    // Returned: resource is available again
    let response = client
        .get(format!("{}/resources/{}", BASE_URL, resource))
        .send()
        .await
        .expect("Failed to fetch resource");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], 1);
}

#[tokio::test]
#[ignore]
async fn test_third_renewal_rejected() {
    let client = staff_client().await;
    let reader = create_reader(&client, "renew-cap@test.org").await;
    let resource = create_resource(&client, "Renew Cap Test").await;

    let response = create_loan(&client, reader, resource).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["reservation"]["id"].as_i64().expect("No reservation id");

    for transition in ["renew", "renew2"] {
        let response = client
            .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
            .json(&json!({ "type": transition }))
            .send()
            .await
            .expect("Failed to send transition");
        assert!(response.status().is_success());
    }

    // No third renewal from Renew2
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
        .json(&json!({ "type": "renew" }))
        .send()
        .await
        .expect("Failed to send transition");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_late_loan_can_only_be_returned() {
    let client = staff_client().await;
    let reader = create_reader(&client, "late-return@test.org").await;
    let resource = create_resource(&client, "Late Return Test").await;

    let response = create_loan(&client, reader, resource).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["reservation"]["id"].as_i64().expect("No reservation id");

    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
        .json(&json!({ "type": "late" }))
        .send()
        .await
        .expect("Failed to mark late");
    assert!(response.status().is_success());

    // Late loans cannot be renewed
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
        .json(&json!({ "type": "renew" }))
        .send()
        .await
        .expect("Failed to send renewal");
    assert_eq!(response.status(), 422);

    // But they can be returned, which frees the resource
    let response = client
        .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
        .json(&json!({ "type": "return" }))
        .send()
        .await
        .expect("Failed to return");
    assert!(response.status().is_success());

    let body: Value = client
        .get(format!("{}/resources/{}", BASE_URL, resource))
        .send()
        .await
        .expect("Failed to fetch resource")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(body["status"], 1);
}

#[tokio::test]
#[ignore]
async fn test_late_sweep_is_idempotent() {
    let client = staff_client().await;

    let first: Value = client
        .post(format!("{}/late/sweep", BASE_URL))
        .send()
        .await
        .expect("Failed to sweep")
        .json()
        .await
        .expect("Failed to parse response");

    // A second immediate sweep finds nothing new to mark
    let second: Value = client
        .post(format!("{}/late/sweep", BASE_URL))
        .send()
        .await
        .expect("Failed to sweep")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(first["updated_count"].is_number());
    assert_eq!(second["updated_count"], 0);
}

#[tokio::test]
#[ignore]
async fn test_user_history_after_return() {
    let client = staff_client().await;
    let reader = create_reader(&client, "history@test.org").await;
    let resource = create_resource(&client, "History Test").await;

    let response = create_loan(&client, reader, resource).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    let reservation_id = body["reservation"]["id"].as_i64().expect("No reservation id");

    client
        .put(format!("{}/transactions/{}", BASE_URL, reservation_id))
        .json(&json!({ "type": "return" }))
        .send()
        .await
        .expect("Failed to return");

    let history: Value = client
        .get(format!("{}/users/{}/history", BASE_URL, reader))
        .send()
        .await
        .expect("Failed to fetch history")
        .json()
        .await
        .expect("Failed to parse response");

    let entries = history.as_array().expect("History is not an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["status"], "Return");
    assert!(entries[0]["return_date"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_reader_signup_starts_pending() {
    let client = Client::new();

    let response = client
        .post(format!("{}/reader-auth/signup", BASE_URL))
        .json(&json!({
            "name": "Pending Reader",
            "email": "pending@test.org",
            "password": "secret",
            "type_id": 1
        }))
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(response.status(), 201);

    // Staff see the account in the pending list
    let staff = staff_client().await;
    let pending: Value = staff
        .get(format!("{}/readers?status=0", BASE_URL))
        .send()
        .await
        .expect("Failed to list pending readers")
        .json()
        .await
        .expect("Failed to parse response");

    let found = pending
        .as_array()
        .expect("Readers is not an array")
        .iter()
        .any(|r| r["email"] == "pending@test.org");
    assert!(found);
}

#[tokio::test]
#[ignore]
async fn test_stats_endpoint() {
    let client = staff_client().await;

    let stats: Value = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch stats")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(stats["total_users"].is_number());
    assert!(stats["total_resources"].is_number());
    assert!(stats["total_reservations"].is_number());

    let monthly: Value = client
        .get(format!("{}/stats/monthly", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch monthly stats")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(monthly.as_array().expect("Not an array").len(), 12);
}
