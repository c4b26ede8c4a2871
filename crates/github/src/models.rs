use serde::Deserialize;

/// The identity behind an access token (`GET /user`).
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A repository visible to the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub private: bool,
    pub default_branch: Option<String>,
}

/// One contents-API entry: a named blob plus the sha that changes on every
/// write. `download_url` is absent for entries that are not plain files
/// (directories, submodules).
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    pub download_url: Option<String>,
}

/// Response of a contents-API write: the new entry (absent after a delete)
/// and the commit that carried it.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCommit {
    pub content: Option<ContentFile>,
    pub commit: Commit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Commit {
    pub sha: Option<String>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
