use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use tracing::debug;

use crate::client::GithubClient;
use crate::error::Result;
use crate::models::{ContentFile, FileCommit, Repository};

#[derive(Serialize)]
struct CreateFile<'a> {
    message: &'a str,
    content: String,
}

#[derive(Serialize)]
struct DeleteFile<'a> {
    message: &'a str,
    sha: &'a str,
}

/// Contents-API operations scoped to one resolved repository.
pub struct ContentsClient<'a> {
    api: &'a GithubClient,
    repo: &'a Repository,
}

impl<'a> ContentsClient<'a> {
    pub fn new(api: &'a GithubClient, repo: &'a Repository) -> Self {
        Self { api, repo }
    }

    /// Current metadata for one path, including the blob sha and download
    /// URL.
    pub async fn get(&self, name: &str) -> Result<ContentFile> {
        self.api.get_json(&self.path(name)).await
    }

    /// Create `name` with `content`. One commit per call; the API transports
    /// the body base64-encoded.
    pub async fn create(&self, name: &str, message: &str, content: &[u8]) -> Result<FileCommit> {
        let body = CreateFile {
            message,
            content: STANDARD.encode(content),
        };
        let committed: FileCommit = self.api.put_json(&self.path(name), &body).await?;
        debug!(name = %name, bytes = content.len(), "content created");
        Ok(committed)
    }

    /// Delete `name`. The API requires the blob's current sha.
    pub async fn delete(&self, name: &str, message: &str, sha: &str) -> Result<FileCommit> {
        let body = DeleteFile { message, sha };
        let committed: FileCommit = self.api.delete_json(&self.path(name), &body).await?;
        debug!(name = %name, sha = %sha, "content deleted");
        Ok(committed)
    }

    fn path(&self, name: &str) -> String {
        format!("/repos/{}/contents/{name}", self.repo.full_name)
    }
}
