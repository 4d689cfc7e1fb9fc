use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use streamvault::config::Config;
use streamvault::services::TokenAuthority;
use tower::ServiceExt;

/// Fixture signing secret injected the way production injects the
/// environment secret.
const TEST_SECRET: &str = "integration-test-secret";

/// Bootstrap admin seeded by the initial migration.
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "password";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.jwt_secret = TEST_SECRET.to_string();

    let state = streamvault::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    streamvault::api::router(state)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Login and return the issued access token.
async fn login(app: &Router, identifier: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": identifier, "password": password }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["data"]["access_token"]
        .as_str()
        .expect("login returns a token")
        .to_string()
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "username": username, "email": email, "password": password }),
        ))
        .await
        .unwrap();

    response.status()
}

#[tokio::test]
async fn protected_routes_reject_before_handler_logic() {
    let app = spawn_app().await;

    // No authorization header at all
    let response = app.clone().oneshot(get("/api/lists", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Header present but garbage token
    let response = app
        .clone()
        .oneshot(get("/api/lists", Some("not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Token signed with a different secret
    let foreign = TokenAuthority::new("some-other-secret")
        .issue(1, true)
        .unwrap();
    let response = app
        .clone()
        .oneshot(get("/api/lists", Some(&foreign)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Expired token with the right secret
    let expired = TokenAuthority::with_ttl(TEST_SECRET, -60)
        .issue(1, true)
        .unwrap();
    let response = app
        .clone()
        .oneshot(get("/api/lists", Some(&expired)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A valid token clears the gate
    let token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(get("/api/lists", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn registration_and_login_flow() {
    let app = spawn_app().await;

    // Register alice
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "username": "alice", "email": "a@x.com", "password": "pw1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["is_admin"], false);
    // The stored credential never crosses the boundary in any form
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    // Same email again is a conflict
    assert_eq!(
        register(&app, "alice2", "a@x.com", "pw2").await,
        StatusCode::CONFLICT
    );

    // Same username again is a conflict
    assert_eq!(
        register(&app, "alice", "other@x.com", "pw2").await,
        StatusCode::CONFLICT
    );

    // Wrong password is a uniform 401
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "alice", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown identity is indistinguishable from a wrong password
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "nobody", "password": "pw1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct password logs in; email works as the identifier too
    let token = login(&app, "alice", "pw1").await;
    assert_eq!(token.split('.').count(), 3);
    let _ = login(&app, "a@x.com", "pw1").await;
}

#[tokio::test]
async fn ownership_and_admin_checks() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "a@x.com", "pw1").await,
        StatusCode::CREATED
    );
    let alice_token = login(&app, "alice", "pw1").await;
    let admin_token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Alice may update her own profile (seeded admin is id 1, alice id 2)
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/users/2",
            Some(&alice_token),
            &json!({ "profile_picture": "2/avatar.png" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // ...but not anyone else's
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/users/1",
            Some(&alice_token),
            &json!({ "username": "hijacked" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // ...and she cannot grant herself the admin flag
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            "/api/users/2",
            Some(&alice_token),
            &json!({ "is_admin": true }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin-only listing is 403 for alice, 200 for the admin
    let response = app
        .clone()
        .oneshot(get("/api/users", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/users?new=true", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);

    // Registration stats are admin-only too
    let response = app
        .clone()
        .oneshot(get("/api/users/stats", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/users/stats", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let total: i64 = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["total"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 2);

    // Public profile fetch needs no token and leaks no hash
    let response = app
        .clone()
        .oneshot(get("/api/users/find/2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("password_hash").is_none());

    // Alice deletes her own account; her credentials stop working
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/users/2")
                .header("Authorization", format!("Bearer {alice_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "username": "alice", "password": "pw1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn movie_catalog_crud() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "a@x.com", "pw1").await,
        StatusCode::CREATED
    );
    let alice_token = login(&app, "alice", "pw1").await;
    let admin_token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let new_movie = json!({
        "title": "The Long Night",
        "description": "A thriller",
        "genre": "thriller",
        "year": "2024",
        "is_series": false
    });

    // Catalog writes are admin-only
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/movies",
            Some(&alice_token),
            &new_movie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/movies",
            Some(&admin_token),
            &new_movie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let movie_id = body["data"]["id"].as_i64().unwrap();

    // Duplicate title is a conflict
    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/api/movies",
            Some(&admin_token),
            &new_movie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Any authenticated user can read
    let response = app
        .clone()
        .oneshot(get(&format!("/api/movies/find/{movie_id}"), Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["title"], "The Long Night");

    let response = app
        .clone()
        .oneshot(get("/api/movies/random?kind=movie", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // No series in the catalog yet
    let response = app
        .clone()
        .oneshot(get("/api/movies/random?kind=series", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Update and delete, admin-only
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/movies/{movie_id}"),
            Some(&admin_token),
            &json!({ "year": "2025" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["year"], "2025");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/movies/{movie_id}"))
                .header("Authorization", format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Catalog is empty again
    let response = app
        .clone()
        .oneshot(get("/api/movies/random", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_crud_and_sampling() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "a@x.com", "pw1").await,
        StatusCode::CREATED
    );
    let alice_token = login(&app, "alice", "pw1").await;
    let admin_token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Seed two catalog entries
    let mut movie_ids = Vec::new();
    for title in ["First Light", "Second Sun"] {
        let response = app
            .clone()
            .oneshot(send_json(
                "POST",
                "/api/movies",
                Some(&admin_token),
                &json!({ "title": title, "genre": "drama" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        movie_ids.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }

    // List creation is admin-only
    let new_list = json!({
        "title": "Editor's Picks",
        "kind": "movie",
        "genre": "drama",
        "content": movie_ids
    });

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/lists", Some(&alice_token), &new_list))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/lists", Some(&admin_token), &new_list))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let list_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(
        body["data"]["content"].as_array().unwrap().len(),
        movie_ids.len()
    );

    // Any authenticated user samples lists; filters apply
    let response = app
        .clone()
        .oneshot(get("/api/lists?kind=movie&genre=drama", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(get("/api/lists?kind=series", Some(&alice_token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Direct fetch is admin-only
    let response = app
        .clone()
        .oneshot(get(&format!("/api/lists/find/{list_id}"), Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Membership replacement preserves the given order
    let reversed: Vec<i64> = movie_ids.iter().rev().copied().collect();
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/api/lists/{list_id}"),
            Some(&admin_token),
            &json!({ "content": reversed }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let content: Vec<i64> = body["data"]["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(content, reversed);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/lists/{list_id}"))
                .header("Authorization", format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn asset_url_generation() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "a@x.com", "pw1").await,
        StatusCode::CREATED
    );
    let alice_token = login(&app, "alice", "pw1").await;
    let admin_token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    // Video uploads are admin-only
    let response = app
        .clone()
        .oneshot(get(
            "/api/assets/videos/upload-url?key=trailer.mp4",
            Some(&alice_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get(
            "/api/assets/videos/upload-url?key=trailer.mp4",
            Some(&admin_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.contains("/movies/full_trailer/trailer.mp4?"));
    assert!(url.contains("X-Amz-Signature="));
    assert_eq!(body["data"]["expires_in"], 30);

    // Profile images are self-service, scoped under the caller's id
    let response = app
        .clone()
        .oneshot(get(
            "/api/assets/profile-images/upload-url?key=avatar.png",
            Some(&alice_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let url = body["data"]["url"].as_str().unwrap();
    assert!(url.contains("/users/profile_images/2/avatar.png?"));

    // Traversal keys are rejected
    let response = app
        .clone()
        .oneshot(get(
            "/api/assets/videos/delete-url?key=../../etc",
            Some(&admin_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn system_status_is_admin_only() {
    let app = spawn_app().await;

    assert_eq!(
        register(&app, "alice", "a@x.com", "pw1").await,
        StatusCode::CREATED
    );
    let alice_token = login(&app, "alice", "pw1").await;
    let admin_token = login(&app, ADMIN_USERNAME, ADMIN_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(get("/api/system/status", Some(&alice_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(get("/api/system/status", Some(&admin_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["users"], 2);
    assert_eq!(body["data"]["movies"], 0);
}
