use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::models::{Repository, User};

const API_BASE: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("hubstore/", env!("CARGO_PKG_VERSION"));

/// Thin typed client for the GitHub REST API.
///
/// Requests are sent once, with no retry or backoff: callers see every
/// non-success response as an [`ApiError`].
#[derive(Debug, Clone)]
pub struct GithubClient {
    token: String,
    base: String,
    http: reqwest::Client,
}

impl GithubClient {
    /// Client for api.github.com.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base(token, API_BASE)
    }

    /// Client for a custom API root (GitHub Enterprise).
    pub fn with_base(token: impl Into<String>, base: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            token: token.into(),
            base: base.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// The API root this client talks to.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The identity behind the configured token. Fails with
    /// [`ApiError::BadCredentials`] when the token is invalid or revoked.
    pub async fn authenticated_user(&self) -> Result<User> {
        self.get_json("/user").await
    }

    /// Look up a repository by `owner/name`.
    pub async fn repository(&self, full_name: &str) -> Result<Repository> {
        self.get_json(&format!("/repos/{full_name}")).await
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let resp = self.prepare(reqwest::Method::GET, &url).send().await?;
        decode(url, resp).await
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let resp = self
            .prepare(reqwest::Method::PUT, &url)
            .json(body)
            .send()
            .await?;
        decode(url, resp).await
    }

    /// DELETE with a JSON body (the contents API requires one) and decode
    /// the JSON response.
    pub async fn delete_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let resp = self
            .prepare(reqwest::Method::DELETE, &url)
            .json(body)
            .send()
            .await?;
        decode(url, resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn prepare(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

async fn decode<T: DeserializeOwned>(url: String, resp: reqwest::Response) -> Result<T> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::BadCredentials { body });
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::NotFound { url, body });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status { status, url, body });
    }

    debug!(url = %url, status = %status, "OK");
    resp.json().await.map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;

    #[test]
    fn base_trailing_slash_is_trimmed() {
        let client = GithubClient::with_base("t", "https://ghe.example.com/api/v3/");
        assert_eq!(client.base(), "https://ghe.example.com/api/v3");
    }

    #[tokio::test]
    async fn authenticated_user_sends_github_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/user")
                .header("authorization", "Bearer secret-token")
                .header("accept", ACCEPT_JSON)
                .header("x-github-api-version", API_VERSION);
            then.status(200)
                .json_body(serde_json::json!({"login": "octocat", "id": 1}));
        });

        let client = GithubClient::with_base("secret-token", server.base_url());
        let user = client.authenticated_user().await.unwrap();

        mock.assert();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_bad_credentials() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/user");
            then.status(401)
                .json_body(serde_json::json!({"message": "Bad credentials"}));
        });

        let client = GithubClient::with_base("expired", server.base_url());
        let err = client.authenticated_user().await.unwrap_err();

        match err {
            ApiError::BadCredentials { body } => assert!(body.contains("Bad credentials")),
            other => panic!("expected BadCredentials, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_repository_maps_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/octocat/gone");
            then.status(404)
                .json_body(serde_json::json!({"message": "Not Found"}));
        });

        let client = GithubClient::with_base("t", server.base_url());
        let err = client.repository("octocat/gone").await.unwrap_err();

        match err {
            ApiError::NotFound { url, body } => {
                assert!(url.ends_with("/repos/octocat/gone"));
                assert!(body.contains("Not Found"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_failures_map_to_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/user");
            then.status(500).body("boom");
        });

        let client = GithubClient::with_base("t", server.base_url());
        let err = client.authenticated_user().await.unwrap_err();

        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
