//! Value types exchanged with the IMAP client.

mod attributes;
mod folder;
mod uid_set;

pub use attributes::Attributes;
pub use folder::Folder;
pub use uid_set::UidSet;
