#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use ghrepo::api::{
    normalize_remote_path, CommitRef, CommittedContent, ContentsApi, ContentsCommitResult, DeleteContentsRequest,
    Identity, PutContentsRequest, TreeResult,
};
use ghrepo::error::{classify_http, CliError};
use ghrepo::repo::RepoSlug;

pub fn slug() -> RepoSlug {
    RepoSlug::parse("owner/repo").unwrap()
}

/// Base64 wrapped at 60 columns the way the hosted API returns it.
pub fn wrapped_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

pub fn file_json(path: &str, sha: &str, data: &[u8]) -> Value {
    json!({
        "type": "file",
        "path": path,
        "sha": sha,
        "size": data.len(),
        "download_url": format!("https://raw.example.com/owner/repo/main/{path}"),
        "content": wrapped_base64(data),
        "encoding": "base64",
    })
}

pub fn item(kind: &str, path: &str, sha: &str, size: u64) -> Value {
    json!({ "type": kind, "path": path, "sha": sha, "size": size, "download_url": null })
}

pub fn tree(sha: &str, entries: &[(&str, &str, &str, u64)], truncated: bool) -> Value {
    let tree: Vec<Value> = entries
        .iter()
        .map(|(path, kind, sha, size)| json!({ "path": path, "mode": "100644", "type": kind, "sha": sha, "size": size }))
        .collect();
    json!({ "sha": sha, "tree": tree, "truncated": truncated })
}

enum Reply {
    Json(Value),
    Status(u16),
}

/// In-memory `ContentsApi` that records every call it receives.
#[derive(Default)]
pub struct FakeApi {
    contents: HashMap<String, Reply>,
    trees: HashMap<String, Value>,
    calls: RefCell<Vec<String>>,
    refs: RefCell<Vec<String>>,
    pub puts: RefCell<Vec<PutContentsRequest>>,
    pub deletes: RefCell<Vec<DeleteContentsRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(mut self, path: &str, body: Value) -> Self {
        self.contents.insert(path.to_string(), Reply::Json(body));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.contents.insert(path.to_string(), Reply::Status(status));
        self
    }

    pub fn with_tree(mut self, sha: &str, body: Value) -> Self {
        self.trees.insert(sha.to_string(), body);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Refs passed to `get_contents`, in call order.
    pub fn refs(&self) -> Vec<String> {
        self.refs.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

fn not_found() -> CliError {
    classify_http(404, false, r#"{"message":"Not Found"}"#)
}

fn commit(path: Option<&str>, sha: &str) -> ContentsCommitResult {
    ContentsCommitResult {
        content: path.map(|p| CommittedContent {
            path: p.to_string(),
            sha: "blob-sha".to_string(),
        }),
        commit: CommitRef { sha: sha.to_string() },
    }
}

impl ContentsApi for FakeApi {
    fn get_identity(&self) -> Result<Identity, CliError> {
        self.record("identity".to_string());
        Ok(Identity {
            login: "octocat".to_string(),
            rate_limit_remaining: 4999,
        })
    }

    fn get_contents(&self, _repo: &RepoSlug, path: &str, git_ref: &str) -> Result<String, CliError> {
        let path = normalize_remote_path(path);
        self.record(format!("contents:{path}"));
        self.refs.borrow_mut().push(git_ref.to_string());
        match self.contents.get(path) {
            Some(Reply::Json(body)) => Ok(body.to_string()),
            Some(Reply::Status(status)) => Err(classify_http(*status, false, "scripted failure")),
            None => Err(not_found()),
        }
    }

    fn get_tree(&self, _repo: &RepoSlug, tree_sha: &str, recursive: bool) -> Result<TreeResult, CliError> {
        self.record(format!("tree:{tree_sha}:{recursive}"));
        let body = self.trees.get(tree_sha).ok_or_else(not_found)?;
        Ok(serde_json::from_value(body.clone()).unwrap())
    }

    fn put_contents(
        &self,
        _repo: &RepoSlug,
        path: &str,
        body: &PutContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        self.record(format!("put:{path}"));
        self.puts.borrow_mut().push(body.clone());
        Ok(commit(Some(path), "commit-put"))
    }

    fn delete_contents(
        &self,
        _repo: &RepoSlug,
        path: &str,
        body: &DeleteContentsRequest,
    ) -> Result<ContentsCommitResult, CliError> {
        self.record(format!("delete:{path}"));
        self.deletes.borrow_mut().push(body.clone());
        Ok(commit(None, "commit-delete"))
    }
}

// ---------------------------------------------------------------------------
// Canned loopback HTTP responder for exercising the real client.
// ---------------------------------------------------------------------------

pub struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
    delay: Duration,
}

impl Canned {
    pub fn json(status: u16, body: &str) -> Self {
        Canned {
            status,
            headers: Vec::new(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string.
    pub target: String,
    /// Lower-cased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct Server {
    pub url: String,
    requests: mpsc::Receiver<Recorded>,
}

impl Server {
    /// Serve `responses` in order, one connection each.
    pub fn start(responses: Vec<Canned>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for canned in responses {
                let Ok((stream, _)) = listener.accept() else { return };
                let Ok(request) = read_request(&stream) else { continue };
                let _ = tx.send(request);
                thread::sleep(canned.delay);
                let _ = write_response(stream, &canned);
            }
        });

        Server { url, requests: rx }
    }

    pub fn next_request(&self) -> Recorded {
        self.requests.recv_timeout(Duration::from_secs(5)).unwrap()
    }
}

/// An address nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn read_request(stream: &TcpStream) -> std::io::Result<Recorded> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = HashMap::new();
    loop {
        line.clear();
        reader.read_line(&mut line)?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0; len];
    reader.read_exact(&mut body)?;

    Ok(Recorded {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn write_response(mut stream: TcpStream, canned: &Canned) -> std::io::Result<()> {
    let mut head = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        canned.status,
        canned.body.len()
    );
    for (name, value) in &canned.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str("\r\n");
    stream.write_all(head.as_bytes())?;
    stream.write_all(canned.body.as_bytes())?;
    stream.flush()
}
