use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use tracing::{debug, info};

use hubstore_github::client::GithubClient;
use hubstore_github::contents::ContentsClient;
use hubstore_github::error::ApiError;
use hubstore_github::models::{ContentFile, Repository};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::file::{OpenMode, RemoteFile};

use super::Storage;

/// Authenticated session: the API client plus the resolved repository
/// handle. Swapped wholesale by [`GithubStorage::reconfigure`].
#[derive(Debug)]
struct Session {
    api: GithubClient,
    repo: Repository,
}

/// Storage adapter that keeps every object as a file committed to one
/// GitHub repository.
///
/// Construction authenticates the token and resolves the repository up
/// front, so a misconfigured adapter fails before it is ever used. Each
/// operation then performs its own round trips sequentially, with no
/// caching of remote state between calls.
#[derive(Debug)]
pub struct GithubStorage {
    /// Plain client for download-URL requests, which are pre-authorized
    /// and must not carry the API token.
    http: reqwest::Client,
    session: RwLock<Session>,
}

impl GithubStorage {
    /// Authenticate and resolve the configured repository.
    ///
    /// Fails with [`StorageError::InvalidCredentials`] when the token is
    /// rejected and [`StorageError::RepositoryNotFound`] when the
    /// repository does not resolve. Both surface here, never lazily on
    /// first use.
    pub async fn connect(config: StorageConfig) -> Result<Self> {
        let session = open_session(&config).await?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Ok(Self {
            http,
            session: RwLock::new(session),
        })
    }

    /// Validate a new configuration and swap it in. In-flight operations
    /// finish against the old session; the old session also stays in place
    /// when any validation step fails.
    pub async fn reconfigure(&self, config: StorageConfig) -> Result<()> {
        let session = open_session(&config).await?;
        *self.session.write().await = session;
        Ok(())
    }

    /// Full name of the repository currently backing the adapter.
    pub async fn repository(&self) -> String {
        self.session.read().await.repo.full_name.clone()
    }

    /// Contents-API metadata for `name`, with the API's 404 mapped to the
    /// storage not-found kind.
    async fn metadata(&self, name: &str) -> Result<ContentFile> {
        let session = self.session.read().await;
        ContentsClient::new(&session.api, &session.repo)
            .get(name)
            .await
            .map_err(|e| not_found_or_api(name, e))
    }
}

#[async_trait]
impl Storage for GithubStorage {
    async fn open(&self, name: &str, mode: OpenMode) -> Result<RemoteFile> {
        let url = self.url(name).await?;
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(StorageError::NotFound {
                name: name.to_string(),
                body,
            });
        }
        if !status.is_success() {
            return Err(StorageError::Http { status, url });
        }

        let data: Bytes = resp.bytes().await?;
        debug!(name = %name, bytes = data.len(), "opened");
        Ok(RemoteFile::new(name, mode, data))
    }

    async fn save(&self, name: &str, content: &[u8]) -> Result<String> {
        let stored = self.available_name(name);
        let message = format!("hubstore: upload {stored}");

        let session = self.session.read().await;
        ContentsClient::new(&session.api, &session.repo)
            .create(&stored, &message, content)
            .await?;

        info!(requested = %name, stored = %stored, bytes = content.len(), "saved");
        Ok(stored)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let session = self.session.read().await;
        let contents = ContentsClient::new(&session.api, &session.repo);

        // The contents API records a deletion against the current blob sha.
        let meta = contents
            .get(name)
            .await
            .map_err(|e| not_found_or_api(name, e))?;
        let message = format!("hubstore: delete {name}");
        contents
            .delete(name, &message, &meta.sha)
            .await
            .map_err(|e| not_found_or_api(name, e))?;

        info!(name = %name, "deleted");
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let url = match self.url(name).await {
            Ok(url) => url,
            Err(StorageError::NotFound { .. }) => return Ok(false),
            Err(e) => return Err(e),
        };

        let resp = self.http.head(&url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else if status.is_success() {
            Ok(true)
        } else {
            Err(StorageError::Http { status, url })
        }
    }

    async fn size(&self, name: &str) -> Result<Option<u64>> {
        // A failed probe reports an unknown size, never an error; the
        // strict probe lives in exists().
        let Ok(url) = self.url(name).await else {
            return Ok(None);
        };
        let Ok(resp) = self.http.head(&url).send().await else {
            return Ok(None);
        };
        if !resp.status().is_success() {
            return Ok(None);
        }
        Ok(content_length(&resp))
    }

    async fn url(&self, name: &str) -> Result<String> {
        let meta = self.metadata(name).await?;
        match meta.download_url {
            Some(url) => Ok(url),
            // Directories and submodules resolve but carry no content.
            None => Err(StorageError::NotFound {
                name: name.to_string(),
                body: format!("no downloadable content for a {} entry", meta.kind),
            }),
        }
    }
}

async fn open_session(config: &StorageConfig) -> Result<Session> {
    let api = match &config.api_base {
        Some(base) => GithubClient::with_base(&config.access_token, base),
        None => GithubClient::new(&config.access_token),
    };

    let user = api.authenticated_user().await.map_err(|e| {
        if matches!(e, ApiError::BadCredentials { .. }) {
            StorageError::InvalidCredentials(e)
        } else {
            StorageError::Api(e)
        }
    })?;
    if user.login.is_empty() {
        return Err(StorageError::InvalidCredentials(ApiError::BadCredentials {
            body: "authenticated identity has no login".to_string(),
        }));
    }

    // A bare repository name resolves under the authenticated login.
    let full_name = if config.repository.contains('/') {
        config.repository.clone()
    } else {
        format!("{}/{}", user.login, config.repository)
    };

    let repo = api.repository(&full_name).await.map_err(|e| {
        if matches!(e, ApiError::NotFound { .. }) {
            StorageError::RepositoryNotFound(full_name.clone())
        } else {
            StorageError::Api(e)
        }
    })?;

    info!(login = %user.login, repo = %repo.full_name, "storage repository resolved");
    Ok(Session { api, repo })
}

fn not_found_or_api(name: &str, err: ApiError) -> StorageError {
    match err {
        ApiError::NotFound { body, .. } => StorageError::NotFound {
            name: name.to_string(),
            body,
        },
        other => StorageError::Api(other),
    }
}

fn content_length(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
