//! Auth client tests against a mock auth service speaking the real contract:
//! form-encoded `POST /token` issuing a bearer token, JSON `POST /users/`,
//! and `detail` bodies on rejection.

use axum::extract::Form;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use serde::Deserialize;

use gatehouse::auth::{with_bearer, AuthClient, NewUser};
use gatehouse::error::AppError;
use gatehouse::identity::{Credential, Identity, Role};
use gatehouse::store::{CredentialStore, MemoryStore};

fn issue_token(sub: &str, role: &str) -> String {
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = engine.encode(
        serde_json::to_vec(&serde_json::json!({"sub": sub, "role": role, "exp": 4102444800i64}))
            .unwrap(),
    );
    format!("{header}.{payload}.sig")
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn token_endpoint(Form(form): Form<LoginForm>) -> Response {
    if form.password != "wrench" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"detail": "Incorrect username or password"})),
        )
            .into_response();
    }
    let token = issue_token(&form.username, "sales");
    Json(serde_json::json!({"access_token": token, "token_type": "bearer"})).into_response()
}

#[derive(Deserialize)]
struct CreateUser {
    username: String,
    email: String,
    #[allow(dead_code)]
    password: String,
    role: String,
}

async fn users_endpoint(Json(user): Json<CreateUser>) -> Response {
    if user.email == "taken@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"detail": "Email already registered"})),
        )
            .into_response();
    }
    Json(serde_json::json!({
        "id": 7,
        "username": user.username,
        "email": user.email,
        "role": user.role
    }))
    .into_response()
}

async fn spawn_mock_auth() -> String {
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .route("/users/", post(users_endpoint));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn login_round_trips_credential_into_store() {
    let base = spawn_mock_auth().await;
    let client = AuthClient::new(&base).unwrap();
    let store = MemoryStore::new();

    let credential = client.login_into(&store, "alice", "wrench").await.unwrap();
    assert_eq!(store.load(), Some(credential.clone()));

    let identity = Identity::from_credential(&credential).unwrap();
    assert_eq!(identity.user.as_deref(), Some("alice"));
    assert_eq!(identity.role, Role::Sales);
}

#[tokio::test]
async fn rejected_login_maps_to_unauthenticated_and_stores_nothing() {
    let base = spawn_mock_auth().await;
    let client = AuthClient::new(&base).unwrap();
    let store = MemoryStore::new();

    let err = client.login_into(&store, "alice", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated { .. }), "got {err}");
    assert_eq!(err.message(), "Incorrect username or password");
    assert_eq!(err.http_status(), 401);
    assert!(store.load().is_none());
}

#[tokio::test]
async fn register_returns_the_created_account() {
    let base = spawn_mock_auth().await;
    let client = AuthClient::new(&base).unwrap();

    let created = client
        .register(&NewUser {
            username: "bob".into(),
            email: "bob@example.com".into(),
            password: "wrench".into(),
            role: Role::Engineer,
        })
        .await
        .unwrap();
    assert_eq!(created.id, 7);
    assert_eq!(created.username, "bob");
    assert_eq!(created.role, "engineer");
}

#[tokio::test]
async fn duplicate_email_surfaces_the_detail() {
    let base = spawn_mock_auth().await;
    let client = AuthClient::new(&base).unwrap();

    let err = client
        .register(&NewUser {
            username: "bob".into(),
            email: "taken@example.com".into(),
            password: "wrench".into(),
            role: Role::Engineer,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UserInput { .. }), "got {err}");
    assert_eq!(err.message(), "Email already registered");
}

#[tokio::test]
async fn with_bearer_attaches_the_authorization_header() {
    let credential = Credential::new(issue_token("alice", "admin"));
    let client = reqwest::Client::new();
    let request = with_bearer(client.get("http://localhost/projects/"), &credential)
        .build()
        .unwrap();
    let header = request.headers().get("authorization").unwrap().to_str().unwrap();
    assert_eq!(header, format!("Bearer {}", credential.as_str()));
}
