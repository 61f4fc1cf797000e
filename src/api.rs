// API gateway: a small blocking HTTP client for the hosted repository
// contents API. Every call is authenticated, and every non-2xx response or
// I/O failure is turned into a classified `CliError` before it leaves here.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{classify_http, classify_transport, CliError};
use crate::repo::RepoSlug;

const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Identity behind the configured token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
    /// Parsed from `X-RateLimit-Remaining`; 0 when missing or malformed.
    pub rate_limit_remaining: u64,
}

/// Raw element of a recursive tree response. `path` is relative to the
/// queried tree, not to the repository root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    /// `blob`, `tree` or `commit`.
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeResult {
    pub sha: String,
    pub tree: Vec<TreeEntry>,
    /// Set when the remote dropped entries beyond its internal limit.
    pub truncated: bool,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutContentsRequest {
    pub message: String,
    /// Base64 of the new file content.
    pub content: String,
    /// Current content hash; omitted on create, required on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// Body of `DELETE /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteContentsRequest {
    pub message: String,
    pub sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommittedContent {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub sha: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitRef {
    #[serde(default)]
    pub sha: String,
}

/// Commit information returned by the write endpoints. `content` is null
/// after a delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentsCommitResult {
    #[serde(default)]
    pub content: Option<CommittedContent>,
    #[serde(default)]
    pub commit: CommitRef,
}

/// The remote operations the resolver depends on. `ApiClient` is the real
/// implementation; tests substitute an in-memory one.
pub trait ContentsApi {
    /// `GET /user`.
    fn get_identity(&self) -> Result<Identity, CliError>;

    /// Shallow contents read. The body is returned undecoded because it is
    /// an object for a file and an array for a directory.
    fn get_contents(&self, repo: &RepoSlug, path: &str, git_ref: &str) -> Result<String, CliError>;

    fn get_tree(&self, repo: &RepoSlug, tree_sha: &str, recursive: bool) -> Result<TreeResult, CliError>;

    fn put_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentsCommitResult, CliError>;

    fn delete_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &DeleteContentsRequest,
    ) -> Result<ContentsCommitResult, CliError>;
}

impl<T: ContentsApi + ?Sized> ContentsApi for &T {
    fn get_identity(&self) -> Result<Identity, CliError> {
        (**self).get_identity()
    }

    fn get_contents(&self, repo: &RepoSlug, path: &str, git_ref: &str) -> Result<String, CliError> {
        (**self).get_contents(repo, path, git_ref)
    }

    fn get_tree(&self, repo: &RepoSlug, tree_sha: &str, recursive: bool) -> Result<TreeResult, CliError> {
        (**self).get_tree(repo, tree_sha, recursive)
    }

    fn put_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        (**self).put_contents(repo, path, body)
    }

    fn delete_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &DeleteContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        (**self).delete_contents(repo, path, body)
    }
}

/// Headers and body of a successful call.
struct Reply {
    headers: HeaderMap,
    body: String,
}

/// Blocking client bound to one base URL and one token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("token", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// Build a client whose every request gives up after `timeout`.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, CliError> {
        let base = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| CliError::bad_args(format!("invalid API base URL: {base_url}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ghrepo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::transport("failed to build HTTP client").with_source(e))?;
        Ok(ApiClient {
            client,
            base,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Base URL extended with `segments`, each one percent-encoded so that
    /// `#`, `?` and spaces in file names stay part of the path.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn contents_url(&self, repo: &RepoSlug, path: &str) -> Url {
        let prefix = ["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        self.endpoint(prefix.into_iter().chain(normalize_remote_path(path).split('/')))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// Send and classify. Only statuses in [200, 300) come back as `Ok`.
    fn send(&self, builder: RequestBuilder) -> Result<Reply, CliError> {
        let res = builder.send().map_err(classify_transport)?;
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.text().map_err(classify_transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(classify_http(status.as_u16(), is_rate_limited(&headers), &body));
        }
        Ok(Reply { headers, body })
    }

    fn send_json<T, B>(&self, method: Method, url: Url, payload: &B) -> Result<T, CliError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(%method, %url, "request");
        let reply = self.send(self.request(method, url).json(payload))?;
        parse_body(&reply.body)
    }
}

impl ContentsApi for ApiClient {
    fn get_identity(&self) -> Result<Identity, CliError> {
        #[derive(Deserialize)]
        struct User {
            login: String,
        }

        let url = self.endpoint(["user"]);
        debug!(url = %url, "GET identity");
        let reply = self.send(self.request(Method::GET, url))?;
        let user: User = parse_body(&reply.body)?;
        let rate_limit_remaining = reply
            .headers
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        Ok(Identity {
            login: user.login,
            rate_limit_remaining,
        })
    }

    fn get_contents(&self, repo: &RepoSlug, path: &str, git_ref: &str) -> Result<String, CliError> {
        let url = self.contents_url(repo, path);
        debug!(url = %url, git_ref, "GET contents");
        let mut builder = self.request(Method::GET, url);
        if !git_ref.is_empty() {
            builder = builder.query(&[("ref", git_ref)]);
        }
        Ok(self.send(builder)?.body)
    }

    fn get_tree(&self, repo: &RepoSlug, tree_sha: &str, recursive: bool) -> Result<TreeResult, CliError> {
        let url = self.endpoint(["repos", repo.owner.as_str(), repo.name.as_str(), "git", "trees", tree_sha]);
        debug!(url = %url, recursive, "GET tree");
        let mut builder = self.request(Method::GET, url);
        if recursive {
            builder = builder.query(&[("recursive", "1")]);
        }
        let reply = self.send(builder)?;
        serde_json::from_str(&reply.body)
            .map_err(|e| CliError::transport("failed to parse tree response").with_source(e))
    }

    fn put_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        let url = self.contents_url(repo, path);
        self.send_json(Method::PUT, url, body)
    }

    fn delete_contents(
        &self,
        repo: &RepoSlug,
        path: &str,
        body: &DeleteContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        let url = self.contents_url(repo, path);
        self.send_json(Method::DELETE, url, body)
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, CliError> {
    serde_json::from_str(body).map_err(|e| CliError::transport("failed to parse response").with_source(e))
}

fn is_rate_limited(headers: &HeaderMap) -> bool {
    headers
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false)
}

/// Strip surrounding slashes; `.` addresses the repository root.
pub fn normalize_remote_path(path: &str) -> &str {
    let trimmed = path.trim_matches('/');
    if trimmed == "." {
        ""
    } else {
        trimmed
    }
}
