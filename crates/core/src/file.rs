use bytes::Bytes;

/// Access intent for [`open`](crate::Storage::open).
///
/// The backend always fetches raw bytes; the mode is recorded on the
/// returned [`RemoteFile`] without ever interpreting the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Binary read, the only distinction the remote store knows.
    #[default]
    Binary,
    /// Text read. Content is still fetched verbatim.
    Text,
}

/// An opened remote object: the stored name it was fetched under, the
/// access intent it was opened with, and its full content.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    name: String,
    mode: OpenMode,
    data: Bytes,
}

impl RemoteFile {
    pub fn new(name: impl Into<String>, mode: OpenMode, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mode,
            data: data.into(),
        }
    }

    /// The stored name this content was fetched under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the file, keeping only its content.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for RemoteFile {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
