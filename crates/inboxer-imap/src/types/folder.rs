//! Opened folder descriptor.

/// The folder a client has opened, as reported by SELECT/EXAMINE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Folder {
    /// Folder name (e.g. `INBOX`).
    pub name: String,
    /// Whether the folder was opened read-only (EXAMINE).
    pub read_only: bool,
    /// Number of messages in the folder.
    pub exists: u32,
    /// Number of messages with the `\Recent` flag.
    pub recent: u32,
    /// Sequence number of the first unseen message, if reported.
    pub unseen: Option<u32>,
    /// UID validity value, if reported.
    pub uid_validity: Option<u32>,
    /// Predicted next UID, if reported.
    pub uid_next: Option<u32>,
    /// Flags defined for the folder.
    pub flags: Vec<String>,
}

impl Folder {
    /// Creates a descriptor with only a name and access mode.
    #[must_use]
    pub fn new(name: impl Into<String>, read_only: bool) -> Self {
        Self {
            name: name.into(),
            read_only,
            ..Self::default()
        }
    }
}
