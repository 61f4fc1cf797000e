// Unified, transient view of remote objects. Values are built per request
// from decoded responses and dropped once rendered or written to disk.

use serde::{Deserialize, Serialize};

/// Kind of a remote filesystem object, normalized from the two remote
/// vocabularies (`file/dir/symlink/submodule` and `blob/tree/commit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

impl EntryKind {
    /// Vocabulary of the shallow contents endpoint.
    pub fn from_contents_type(kind: &str) -> Option<Self> {
        match kind {
            "file" => Some(EntryKind::File),
            "dir" => Some(EntryKind::Dir),
            "symlink" => Some(EntryKind::Symlink),
            "submodule" => Some(EntryKind::Submodule),
            _ => None,
        }
    }

    /// Vocabulary of the recursive tree endpoint.
    pub fn from_tree_type(kind: &str) -> Option<Self> {
        match kind {
            "blob" => Some(EntryKind::File),
            "tree" => Some(EntryKind::Dir),
            "commit" => Some(EntryKind::Submodule),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Dir => "dir",
            EntryKind::Symlink => "symlink",
            EntryKind::Submodule => "submodule",
        }
    }
}

/// One remote object. `path` is relative to the repository root and never
/// carries a leading or trailing slash. `sha` is the content hash, which
/// doubles as the concurrency token for updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl Entry {
    /// Synthetic entry for a directory seen only through its listing.
    pub fn directory(path: &str) -> Self {
        Entry {
            kind: EntryKind::Dir,
            path: path.to_string(),
            sha: String::new(),
            size: 0,
            download_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Created,
    Updated,
    Deleted,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Created => "created",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
        }
    }
}

/// Outcome of a create, update or delete. `sha` is the hash of the commit
/// the remote store created, not a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub action: Action,
    pub path: String,
    pub sha: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}
