// Content resolver: turns the remote's two listing mechanisms (the shallow
// contents endpoint and the hash-addressed tree endpoint) into one
// path-addressed view, and drives reads, downloads and writes on top of it.
// No state survives between calls.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::{normalize_remote_path, ContentsApi, DeleteContentsRequest, PutContentsRequest, TreeEntry};
use crate::error::{Category, CliError};
use crate::model::{Action, Entry, EntryKind, MutationResult};
use crate::repo::RepoSlug;
use crate::transfer;

/// One item of a shallow contents response. Every field defaults so that
/// partial or unexpected shapes still decode; callers gate on `sha`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentsItem {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    sha: String,
    size: u64,
    download_url: Option<String>,
    content: Option<String>,
    encoding: Option<String>,
}

impl ContentsItem {
    fn is(&self, kind: EntryKind) -> bool {
        self.kind == kind.as_str()
    }

    fn into_entry(self) -> Result<Entry, CliError> {
        let kind = EntryKind::from_contents_type(&self.kind)
            .ok_or_else(|| CliError::transport(format!("unexpected entry type {:?}", self.kind)))?;
        Ok(Entry {
            kind,
            path: self.path,
            sha: self.sha,
            size: self.size,
            download_url: self.download_url,
        })
    }
}

/// The shallow endpoint answers with an object for a single object and an
/// array for a directory.
enum Contents {
    Object(ContentsItem),
    Listing(Vec<ContentsItem>),
}

/// Decode by trial: an object only counts when it carries a content hash,
/// because other shapes can decode into an object with blank fields.
fn decode_contents(raw: &str) -> Result<Contents, CliError> {
    if let Ok(item) = serde_json::from_str::<ContentsItem>(raw) {
        if !item.sha.is_empty() {
            return Ok(Contents::Object(item));
        }
    }
    serde_json::from_str::<Vec<ContentsItem>>(raw)
        .map(Contents::Listing)
        .map_err(|e| CliError::transport("unexpected contents response format").with_source(e))
}

fn is_root(path: &str) -> bool {
    normalize_remote_path(path).is_empty()
}

/// Re-attach the queried directory to a path relative to it.
fn join_remote(base: &str, rel: &str) -> String {
    let base = normalize_remote_path(base);
    if base.is_empty() {
        rel.to_string()
    } else {
        format!("{base}/{rel}")
    }
}

fn tree_entry_to_entry(base: &str, te: TreeEntry) -> Result<Entry, CliError> {
    let kind = EntryKind::from_tree_type(&te.kind)
        .ok_or_else(|| CliError::transport(format!("unexpected tree entry type {:?}", te.kind)))?;
    Ok(Entry {
        kind,
        path: join_remote(base, &te.path),
        sha: te.sha,
        size: te.size,
        download_url: None,
    })
}

fn file_not_dir(path: &str) -> CliError {
    CliError::bad_args(format!("path {path:?} is a file, not a directory"))
}

/// Repository content operations bound to one repository.
pub struct RepoService<A> {
    api: A,
    repo: RepoSlug,
}

impl<A: ContentsApi> RepoService<A> {
    pub fn new(api: A, repo: RepoSlug) -> Self {
        RepoService { api, repo }
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    fn contents(&self, path: &str, git_ref: &str) -> Result<String, CliError> {
        self.api.get_contents(&self.repo, path, git_ref)
    }

    /// Metadata for one path. Directories come back as a synthetic entry
    /// with only `type` and `path` set.
    pub fn stat(&self, git_ref: &str, path: &str) -> Result<Entry, CliError> {
        debug!(repo = %self.repo, path, git_ref, "stat");
        match decode_contents(&self.contents(path, git_ref)?)? {
            Contents::Object(item) => item.into_entry(),
            Contents::Listing(_) => Ok(Entry::directory(normalize_remote_path(path))),
        }
    }

    /// Children of a directory. Flat listings come from the contents
    /// endpoint; recursive ones from the tree endpoint with every path
    /// re-rooted at the repository.
    pub fn list(&self, git_ref: &str, path: &str, recursive: bool) -> Result<Vec<Entry>, CliError> {
        debug!(repo = %self.repo, path, git_ref, recursive, "list");
        if recursive {
            self.list_recursive(git_ref, path)
        } else {
            self.list_flat(git_ref, path)
        }
    }

    fn list_flat(&self, git_ref: &str, path: &str) -> Result<Vec<Entry>, CliError> {
        match decode_contents(&self.contents(path, git_ref)?) {
            Ok(Contents::Listing(items)) => items.into_iter().map(ContentsItem::into_entry).collect(),
            Ok(Contents::Object(_)) | Err(_) => Err(file_not_dir(path)),
        }
    }

    fn list_recursive(&self, git_ref: &str, path: &str) -> Result<Vec<Entry>, CliError> {
        match decode_contents(&self.contents(path, git_ref)?) {
            Ok(Contents::Listing(_)) => {}
            Ok(Contents::Object(_)) | Err(_) => return Err(file_not_dir(path)),
        }

        let tree_sha = self.dir_tree_sha(git_ref, path)?;
        let tree = self.api.get_tree(&self.repo, &tree_sha, true)?;
        if tree.truncated {
            warn!(path, "tree listing was truncated by the remote API; results are incomplete");
        }

        tree.tree
            .into_iter()
            .map(|te| tree_entry_to_entry(path, te))
            .collect()
    }

    /// Tree identifier of a directory. The root is addressed by the ref
    /// itself; anything else is found by scanning the parent's listing for a
    /// same-named directory.
    fn dir_tree_sha(&self, git_ref: &str, path: &str) -> Result<String, CliError> {
        if is_root(path) {
            return Ok(if git_ref.is_empty() { "HEAD" } else { git_ref }.to_string());
        }

        let path = normalize_remote_path(path);
        let (parent, base) = path.rsplit_once('/').unwrap_or(("", path));

        let items = match decode_contents(&self.contents(parent, git_ref)?)? {
            Contents::Listing(items) => items,
            Contents::Object(_) => return Err(CliError::transport("unexpected contents response format")),
        };

        items
            .into_iter()
            .find(|item| item.is(EntryKind::Dir) && item.path.rsplit('/').next() == Some(base))
            .map(|item| item.sha)
            .ok_or_else(|| CliError::not_found(format!("directory {path:?} not found")))
    }

    /// Decoded bytes of a single file.
    pub fn read_file(&self, git_ref: &str, path: &str) -> Result<Vec<u8>, CliError> {
        debug!(repo = %self.repo, path, git_ref, "read file");
        let item = match decode_contents(&self.contents(path, git_ref)?)? {
            Contents::Object(item) => item,
            Contents::Listing(_) => {
                return Err(CliError::bad_args(format!("path {path:?} is a dir, not a file")));
            }
        };

        if !item.is(EntryKind::File) {
            return Err(CliError::bad_args(format!("path {path:?} is a {}, not a file", item.kind)));
        }

        let encoding = item.encoding.unwrap_or_default();
        if encoding != "base64" {
            return Err(CliError::transport(format!("unsupported encoding {encoding:?}")));
        }

        // The remote wraps base64 at a fixed column width.
        let cleaned: String = item
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();
        STANDARD
            .decode(cleaned)
            .map_err(|e| CliError::transport("failed to decode base64 content").with_source(e))
    }

    /// Copy a remote file or directory to `out`. Returns the number of files
    /// written. Files already written stay on disk when a later one fails.
    pub fn download(&self, git_ref: &str, remote_path: &str, out: &Path, overwrite: bool) -> Result<usize, CliError> {
        debug!(repo = %self.repo, remote_path, out = %out.display(), overwrite, "download");
        let is_file = matches!(
            decode_contents(&self.contents(remote_path, git_ref)?),
            Ok(Contents::Object(ref item)) if item.is(EntryKind::File)
        );

        if is_file {
            self.download_file(git_ref, remote_path, out, overwrite)?;
            Ok(1)
        } else {
            self.download_dir(git_ref, remote_path, out, overwrite)
        }
    }

    fn download_file(&self, git_ref: &str, remote_path: &str, out: &Path, overwrite: bool) -> Result<(), CliError> {
        transfer::ensure_writable(out, overwrite)?;
        let data = self.read_file(git_ref, remote_path)?;
        transfer::write_file(out, &data)
    }

    fn download_dir(&self, git_ref: &str, remote_path: &str, out: &Path, overwrite: bool) -> Result<usize, CliError> {
        let prefix = normalize_remote_path(remote_path);
        let mut written = 0;

        for entry in self.list(git_ref, remote_path, true)? {
            if entry.kind != EntryKind::File {
                continue;
            }
            let rel = if prefix.is_empty() {
                entry.path.as_str()
            } else {
                entry
                    .path
                    .strip_prefix(prefix)
                    .and_then(|p| p.strip_prefix('/'))
                    .unwrap_or(&entry.path)
            };
            let local = transfer::local_target(out, rel)?;
            self.download_file(git_ref, &entry.path, &local, overwrite)?;
            written += 1;
        }

        Ok(written)
    }

    /// Current content hash of `path` on `branch`, or `None` when nothing
    /// is there yet.
    fn existing_sha(&self, branch: &str, path: &str) -> Result<Option<String>, CliError> {
        let raw = match self.contents(path, branch) {
            Ok(raw) => raw,
            Err(err) if err.category == Category::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        match decode_contents(&raw) {
            Ok(Contents::Object(item)) => Ok(Some(item.sha)),
            Ok(Contents::Listing(_)) => Err(CliError::bad_args(format!(
                "path {path:?} is a directory; only files can be written"
            ))),
            Err(_) => Ok(None),
        }
    }

    /// Create `path` if it does not exist yet, otherwise update it using its
    /// current content hash as the concurrency token.
    pub fn create_or_update_file(
        &self,
        branch: &str,
        path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<MutationResult, CliError> {
        let path = normalize_remote_path(path);
        let sha = self.existing_sha(branch, path)?;
        let action = if sha.is_some() { Action::Updated } else { Action::Created };
        debug!(repo = %self.repo, path, branch, action = action.as_str(), "put");

        let request = PutContentsRequest {
            message: message.to_string(),
            content: STANDARD.encode(content),
            sha,
            branch: non_empty(branch),
        };
        let reply = self.api.put_contents(&self.repo, path, &request)?;

        Ok(MutationResult {
            action,
            path: reply
                .content
                .map(|c| c.path)
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| path.to_string()),
            sha: reply.commit.sha,
            branch: non_empty(branch),
        })
    }

    /// Delete a single file. Directories are refused before any write.
    pub fn delete_file(&self, branch: &str, path: &str, message: &str) -> Result<MutationResult, CliError> {
        let path = normalize_remote_path(path);
        debug!(repo = %self.repo, path, branch, "delete");

        let sha = match decode_contents(&self.contents(path, branch)?)? {
            Contents::Object(item) => item.sha,
            Contents::Listing(_) => {
                return Err(CliError::bad_args(format!(
                    "path {path:?} is a directory; only single files can be deleted"
                )));
            }
        };

        let request = DeleteContentsRequest {
            message: message.to_string(),
            sha,
            branch: non_empty(branch),
        };
        let reply = self.api.delete_contents(&self.repo, path, &request)?;

        Ok(MutationResult {
            action: Action::Deleted,
            path: path.to_string(),
            sha: reply.commit.sha,
            branch: non_empty(branch),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
