use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::data::repositories::memory::InMemoryStore;
use crate::domain::validation::{FUTURE_YEAR_MESSAGE, PASSWORD_MISMATCH_MESSAGE, current_year};
use crate::presentation::AppState;
use crate::server::build_router;

fn app() -> Router {
    build_router(AppState::in_memory(InMemoryStore::new()))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request must build"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body must be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body must be json")
    };
    (status, value)
}

async fn register(app: &Router, username: &str) -> (i64, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/accounts/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "very-secure-password",
            "password2": "very-secure-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let id = body["user"]["id"].as_i64().expect("user id");
    let token = body["token"].as_str().expect("token").to_string();
    (id, token)
}

async fn create_book(app: &Router, token: &str, title: &str, author: &str, price: f64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/books",
        Some(token),
        Some(json!({ "title": title, "author": author, "price": price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

fn titles(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("list must be an array")
        .iter()
        .map(|book| book["title"].as_str().expect("title"))
        .collect()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (status, body) = send(&app(), "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn anonymous_create_is_denied_and_stores_nothing() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/books")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "title": "Dune", "author": "Frank Herbert", "price": 9.5 })
                        .to_string(),
                ))
                .expect("request must build"),
        )
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Token")
    );

    let (status, body) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    let (_, authors) = send(&app, "GET", "/api/authors", None, None).await;
    assert_eq!(authors, json!([]));
}

#[tokio::test]
async fn anonymous_denial_happens_before_body_parsing() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/books")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .expect("request must build"),
        )
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_filter_and_ordering_compose() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;
    create_book(&app, &token, "Django for Beginners", "William S. Vincent", 10.0).await;
    create_book(&app, &token, "Advanced Django", "Jane Doe", 20.0).await;
    create_book(&app, &token, "Rust in Action", "Tim McNamara", 15.0).await;

    let (status, body) = send(&app, "GET", "/api/books?search=Django", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Advanced Django", "Django for Beginners"]);

    let (_, body) = send(&app, "GET", "/api/books?price=20", None, None).await;
    assert_eq!(titles(&body), vec!["Advanced Django"]);

    let (_, body) = send(&app, "GET", "/api/books?search=django&ordering=price", None, None).await;
    assert_eq!(titles(&body), vec!["Django for Beginners", "Advanced Django"]);

    let (_, body) = send(&app, "GET", "/api/books?ordering=-price", None, None).await;
    assert_eq!(
        titles(&body),
        vec!["Advanced Django", "Rust in Action", "Django for Beginners"]
    );

    let (_, body) = send(&app, "GET", "/api/books?author=Jane%20Doe", None, None).await;
    assert_eq!(titles(&body), vec!["Advanced Django"]);
}

#[tokio::test]
async fn bad_query_parameters_are_rejected() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/books?ordering=password", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["ordering"].is_array(), "{body}");

    let (status, body) = send(&app, "GET", "/api/books?price=cheap", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["price"].is_array(), "{body}");
}

#[tokio::test]
async fn future_publication_year_is_rejected() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({
            "title": "From the future",
            "author": "Nobody Yet",
            "publication_year": current_year() + 1,
            "price": 1.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["publication_year"], json!([FUTURE_YEAR_MESSAGE]));

    let (status, _) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({
            "title": "From this year",
            "author": "Somebody",
            "publication_year": current_year(),
            "price": 1.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn invalid_book_payload_reports_every_field() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({ "title": "  ", "author": "", "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["title"].is_array(), "{body}");
    assert!(body["fields"]["author"].is_array(), "{body}");

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({ "title": "No price", "author": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["price"], json!(["This field is required."]));
}

#[tokio::test]
async fn missing_price_does_not_hide_other_field_errors() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({
            "title": "",
            "author": "A",
            "publication_year": current_year() + 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["price"], json!(["This field is required."]));
    assert_eq!(body["fields"]["publication_year"], json!([FUTURE_YEAR_MESSAGE]));
    assert!(body["fields"]["title"].is_array(), "{body}");

    let (status, body) = send(
        &app,
        "POST",
        "/api/books",
        Some(&token),
        Some(json!({
            "title": "x".repeat(300),
            "author": "A",
            "publication_year": current_year() + 5,
            "price": 1.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fields"]["title"],
        json!(["Ensure this field has no more than 255 characters."])
    );
    assert_eq!(body["fields"]["publication_year"], json!([FUTURE_YEAR_MESSAGE]));

    let (_, books) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(books, json!([]));
}

#[tokio::test]
async fn registration_reports_every_bad_field() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts/register",
        None,
        Some(json!({
            "username": "u".repeat(200),
            "email": "not-an-email",
            "password": "a",
            "password2": "b",
            "bio": "b".repeat(2001),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["username", "email", "password", "bio"] {
        assert!(body["fields"][field].is_array(), "{field} missing in {body}");
    }
}

#[tokio::test]
async fn update_then_delete_book() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;
    let book = create_book(&app, &token, "Django for Beginners", "William S. Vincent", 10.0).await;
    let uri = format!("/api/books/{}", book["id"]);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({
            "title": "Django for Professionals",
            "author": "William S. Vincent",
            "publication_year": 2019,
            "description": "Second book.",
            "price": 12.5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "Django for Professionals");
    assert_eq!(body["author_id"], book["author_id"]);
    assert_eq!(body["price"].as_f64(), Some(12.5));

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(list, json!([]));

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn referenced_author_cannot_be_deleted() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;
    let book = create_book(&app, &token, "Dune", "Frank Herbert", 9.5).await;
    let author_uri = format!("/api/authors/{}", book["author_id"]);

    let (status, author) = send(&app, "GET", &author_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author["book_count"], 1);

    let (status, _) = send(&app, "DELETE", &author_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/books/{}", book["id"]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &author_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_author_name_conflicts() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/authors",
        Some(&token),
        Some(json!({ "name": "Octavia E. Butler" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/authors",
        Some(&token),
        Some(json!({ "name": "Octavia E. Butler" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn password_mismatch_creates_no_account() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts/register",
        None,
        Some(json!({
            "username": "reader",
            "password": "very-secure-password",
            "password2": "something-else",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["password"], json!([PASSWORD_MISMATCH_MESSAGE]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts/login",
        None,
        Some(json!({ "username": "reader", "password": "very-secure-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unable to log in with provided credentials.");
}

#[tokio::test]
async fn client_cannot_set_read_only_user_fields() {
    let app = app();
    let (_, token) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts/register",
        None,
        Some(json!({
            "id": 999,
            "username": "mallory",
            "password": "pw",
            "password2": "pw",
            "followers": [1],
            "following": [1],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_ne!(body["user"]["id"], 999);
    assert_eq!(body["user"]["followers"], json!([]));
    assert_eq!(body["user"]["following"], json!([]));

    let (_, alice) = send(&app, "GET", "/api/accounts/profile", Some(&token), None).await;
    assert_eq!(alice["followers"], json!([]));
}

#[tokio::test]
async fn login_logout_cycle() {
    let app = app();
    let (_, token) = register(&app, "reader").await;
    let credentials = json!({ "username": "reader", "password": "very-secure-password" });

    let (status, body) = send(
        &app,
        "POST",
        "/api/accounts/login",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());

    let (status, _) = send(&app, "POST", "/api/accounts/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/api/accounts/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // a revoked token is rejected even where anonymous reads are allowed
    let (status, _) = send(&app, "GET", "/api/books", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "POST", "/api/accounts/login", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["token"], token.as_str());
}

#[tokio::test]
async fn profile_requires_authentication() {
    let app = app();

    let (status, _) = send(&app, "GET", "/api/accounts/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/accounts/profile", Some("not-a-key"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_is_partial() {
    let app = app();
    let (_, token) = register(&app, "reader").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/accounts/profile",
        Some(&token),
        Some(json!({ "bio": "Reads everything.", "profile_picture": "avatars/reader.png" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["bio"], "Reads everything.");
    assert_eq!(body["profile_picture"], "avatars/reader.png");
    assert_eq!(body["email"], "reader@example.com");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/accounts/profile",
        Some(&token),
        Some(json!({ "email": "broken" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["fields"]["email"].is_array(), "{body}");
}

#[tokio::test]
async fn follow_and_unfollow() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;
    let (bob_id, bob_token) = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/accounts/follow/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["following"], json!([bob_id]));

    let (_, bob) = send(&app, "GET", "/api/accounts/profile", Some(&bob_token), None).await;
    assert_eq!(bob["followers"], json!([alice_id]));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/accounts/follow/{alice_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/accounts/follow/9999",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/accounts/follow/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["following"], json!([]));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app();
    let (_, token) = register(&app, "librarian").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/books")
                .header(header::AUTHORIZATION, format!("Token {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .expect("request must build"),
        )
        .await
        .expect("router is infallible");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(&app(), "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/books"].is_object());
}
