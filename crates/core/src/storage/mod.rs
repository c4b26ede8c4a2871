pub mod github;

use async_trait::async_trait;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::Result;
use crate::file::{OpenMode, RemoteFile};

/// Bytes of randomness in a generated name prefix. Rendered as hex, so the
/// prefix is twice this many characters.
const NAME_TOKEN_BYTES: usize = 4;

/// The capability set a file-storage backend provides to host applications.
///
/// Writes are not idempotent: [`save`](Storage::save) commits a fresh object
/// on every call and [`delete`](Storage::delete) removes exactly one object,
/// so neither is safe to retry blindly. The read operations are.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Fetch the content stored under `name`, which must be the exact name
    /// returned by [`save`](Storage::save).
    async fn open(&self, name: &str, mode: OpenMode) -> Result<RemoteFile>;

    /// Store `content` under a collision-avoiding variant of `name` and
    /// return the name actually used. Callers must keep the returned name;
    /// it always differs from the requested one.
    async fn save(&self, name: &str, content: &[u8]) -> Result<String>;

    /// Remove the object stored under `name`.
    async fn delete(&self, name: &str) -> Result<()>;

    /// Whether an object is stored under `name`.
    async fn exists(&self, name: &str) -> Result<bool>;

    /// Content length of the object stored under `name`, or `None` when
    /// the probe fails for any reason.
    async fn size(&self, name: &str) -> Result<Option<u64>>;

    /// A download URL for the object stored under `name`, re-resolved on
    /// every call. The backing provider may hand out short-lived URLs, so
    /// callers should not persist the result.
    async fn url(&self, name: &str) -> Result<String>;

    /// The name content will actually be stored under: `name` behind a
    /// short random hex prefix, applied unconditionally on every save.
    /// Save never probes whether the requested name is taken.
    fn available_name(&self, name: &str) -> String {
        prefixed_name(name)
    }
}

fn prefixed_name(name: &str) -> String {
    let mut token = [0u8; NAME_TOKEN_BYTES];
    OsRng.fill_bytes(&mut token);
    format!("{}{name}", hex::encode(token))
}
