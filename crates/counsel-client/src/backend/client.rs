use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::error::{BackendError, BackendResult};
use super::session::{Session, SessionStore};

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Authenticated JSON client for the admin backend.
///
/// Every authenticated call reads the token from the session store. A `401`
/// clears the stored session and surfaces as [`BackendError::Unauthorized`].
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, sessions: Arc<dyn SessionStore>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, sessions)
    }

    pub fn with_client(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.sessions.load()
    }

    /// Exchange credentials for a session and store it.
    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<Session> {
        let session: Session = self
            .execute(
                Method::POST,
                "/admin/login",
                |req| req.json(&Credentials { email, password }),
                false,
            )
            .await?;

        tracing::info!("Admin signed in");
        self.sessions.save(session.clone());
        Ok(session)
    }

    pub fn sign_out(&self) {
        self.sessions.clear();
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        self.execute(Method::GET, path, |req| req, true).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> BackendResult<T> {
        self.execute(Method::GET, path, |req| req.query(query), true).await
    }

    /// GET without the bearer token
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        self.execute(Method::GET, path, |req| req, false).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        self.execute(Method::POST, path, |req| req.json(body), true).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        self.execute(Method::PUT, path, |req| req.json(body), true).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<T> {
        self.execute(Method::PATCH, path, |req| req.json(body), true).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> BackendResult<T> {
        self.execute(Method::DELETE, path, |req| req, true).await
    }

    async fn execute<T, F>(&self, method: Method, path: &str, build: F, auth: bool) -> BackendResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = build(self.http_client.request(method.clone(), &url));

        if auth {
            let Some(session) = self.sessions.load() else {
                tracing::debug!(%method, path, "No session for authenticated request");
                return Err(BackendError::Unauthorized);
            };
            request = request.bearer_auth(session.access_token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "Backend response");

        if status == StatusCode::UNAUTHORIZED && auth {
            tracing::warn!(path, "Backend rejected the session; signing out");
            self.sessions.clear();
            return Err(BackendError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // Endpoints without a payload answer with an empty body
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }
}
