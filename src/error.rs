// Error classifier: every failure that leaves the core is a `CliError`
// carrying one category from a closed set. Categories map one-to-one onto
// process exit codes so scripts can branch on them.

use std::error::Error as StdError;
use std::io::ErrorKind;

use thiserror::Error;

pub const EXIT_UNCLASSIFIED: i32 = 1;
pub const EXIT_AUTH_FAILURE: i32 = 10;
pub const EXIT_PERMISSION: i32 = 11;
pub const EXIT_NOT_FOUND: i32 = 12;
pub const EXIT_BAD_ARGS: i32 = 13;
pub const EXIT_TRANSPORT: i32 = 14;
pub const EXIT_RATE_LIMIT: i32 = 15;
pub const EXIT_LOCAL_WRITE: i32 = 16;
pub const EXIT_USER_ABORT: i32 = 17;

/// Closed taxonomy of failures, ordered by exit-code assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// 401 or missing token.
    AuthFailure,
    /// 403 without rate limiting.
    Permission,
    NotFound,
    /// Invalid arguments or the wrong kind of object for an operation.
    BadArgs,
    /// Timeouts, connection failures and unexpected responses.
    Transport,
    RateLimit,
    LocalWriteError,
    UserAbort,
}

impl Category {
    pub fn exit_code(self) -> i32 {
        match self {
            Category::AuthFailure => EXIT_AUTH_FAILURE,
            Category::Permission => EXIT_PERMISSION,
            Category::NotFound => EXIT_NOT_FOUND,
            Category::BadArgs => EXIT_BAD_ARGS,
            Category::Transport => EXIT_TRANSPORT,
            Category::RateLimit => EXIT_RATE_LIMIT,
            Category::LocalWriteError => EXIT_LOCAL_WRITE,
            Category::UserAbort => EXIT_USER_ABORT,
        }
    }
}

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// The single error shape produced by the gateway, resolver and transfer
/// layer. The message is what users see; `source` keeps the low-level cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    pub category: Category,
    pub message: String,
    #[source]
    pub source: Option<Cause>,
}

impl CliError {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        CliError {
            category,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error that triggered this one.
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(Category::AuthFailure, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::new(Category::Permission, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Category::NotFound, message)
    }

    pub fn bad_args(message: impl Into<String>) -> Self {
        Self::new(Category::BadArgs, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(Category::Transport, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(Category::RateLimit, message)
    }

    pub fn local_write(message: impl Into<String>) -> Self {
        Self::new(Category::LocalWriteError, message)
    }

    pub fn user_abort(message: impl Into<String>) -> Self {
        Self::new(Category::UserAbort, message)
    }
}

/// Map a non-2xx response onto a category. `rate_limited` is true when the
/// response advertised zero remaining requests.
pub fn classify_http(status: u16, rate_limited: bool, body: &str) -> CliError {
    match status {
        401 => CliError::auth_failure("authentication failed: invalid or expired token"),
        403 if rate_limited => CliError::rate_limit("rate limit exceeded"),
        403 => CliError::permission("permission denied: insufficient token scope"),
        404 => CliError::not_found(format!("not found: {body}")),
        _ => CliError::transport(format!("unexpected HTTP {status}: {body}")),
    }
}

/// Map a failed request (no HTTP status available) onto a transport error.
pub fn classify_transport(err: reqwest::Error) -> CliError {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() || looks_like_network_failure(&err) {
        "network error"
    } else {
        "request failed"
    };
    CliError::transport(message).with_source(err)
}

fn looks_like_network_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionRefused
                    | ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::NotConnected
                    | ErrorKind::AddrNotAvailable
            ) {
                return true;
            }
        }
        let text = e.to_string();
        if text.contains("connection refused")
            || text.contains("no such host")
            || text.contains("failed to lookup address")
            || text.contains("dns error")
        {
            return true;
        }
        current = e.source();
    }
    false
}
