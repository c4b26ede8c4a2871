pub mod config;
pub mod error;
pub mod file;
pub mod storage;

pub use config::{Settings, StorageConfig};
pub use error::{Result, StorageError};
pub use file::{OpenMode, RemoteFile};
pub use storage::Storage;
pub use storage::github::GithubStorage;

pub use hubstore_github as github;
