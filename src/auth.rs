//! Client half of the auth service contract: obtain a bearer credential
//! (`POST /token`, form-encoded), create accounts (`POST /users/`), and
//! decorate outgoing requests with the stored credential. The guard never
//! calls the auth service itself; it only consumes the string stored here.

use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::identity::{Credential, Role};
use crate::store::CredentialStore;

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct TokenReply {
    access_token: String,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    #[serde(default)]
    detail: Option<String>,
}

pub struct AuthClient {
    base: Url,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base: &str) -> AppResult<Self> {
        let base = Url::parse(base)
            .map_err(|e| AppError::user("bad_url".to_string(), e.to_string()))?;
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { base, client })
    }

    /// `POST /token` with form-encoded username/password; the reply carries
    /// the bearer string under `access_token`.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Credential> {
        let url = self.join("/token")?;
        let form = [("username", username), ("password", password)];
        let resp = self.client.post(url).form(&form).send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            let detail = detail_of(resp).await;
            tracing::info!("auth.login user={} rejected", username);
            return Err(AppError::unauthenticated("login_rejected".to_string(), detail));
        }
        if !status.is_success() {
            return Err(AppError::http("login_failed".to_string(), format!("HTTP {status}")));
        }
        let reply: TokenReply = resp.json().await?;
        tracing::info!("auth.login user={} ok", username);
        Ok(Credential::new(reply.access_token))
    }

    /// Login and persist the credential through the store, the way the login
    /// view writes the storage slot on success.
    pub async fn login_into(
        &self,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
    ) -> AppResult<Credential> {
        let credential = self.login(username, password).await?;
        store.store(&credential)?;
        Ok(credential)
    }

    /// `POST /users/`. The service replies with the created account or a 400
    /// detail (duplicate email).
    pub async fn register(&self, user: &NewUser) -> AppResult<RegisteredUser> {
        let url = self.join("/users/")?;
        let resp = self.client.post(url).json(user).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = detail_of(resp).await;
            tracing::info!("auth.register user={} rejected: {}", user.username, detail);
            return Err(AppError::user("register_rejected".to_string(), detail));
        }
        let created: RegisteredUser = resp.json().await?;
        tracing::info!("auth.register user={} id={}", created.username, created.id);
        Ok(created)
    }

    fn join(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path)
            .map_err(|e| AppError::internal("bad_path".to_string(), e.to_string()))
    }
}

/// `Authorization: Bearer <token>` decoration for the pages' own domain
/// calls. The guard guarantees the credential is present and decodable
/// before a page gets this far, not that the backend will accept it.
pub fn with_bearer(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
    builder.bearer_auth(credential.as_str())
}

async fn detail_of(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<ErrorReply>().await {
        Ok(ErrorReply { detail: Some(d) }) => d,
        _ => format!("HTTP {status}"),
    }
}
