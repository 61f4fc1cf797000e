// Output formatting: every result renders either as line-oriented
// `key: value` text or as indented JSON with the same field names.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::model::{Entry, MutationResult};

/// Result of `auth check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthReport {
    pub status: String,
    pub user: String,
    pub rate_limit_remaining: u64,
}

fn write_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}

pub fn print_auth<W: Write>(w: &mut W, report: &AuthReport, json: bool) -> io::Result<()> {
    if json {
        return write_json(w, report);
    }
    writeln!(w, "auth: {}", report.status)?;
    writeln!(w, "user: {}", report.user)?;
    writeln!(w, "rate_limit_remaining: {}", report.rate_limit_remaining)
}

/// Errors go to stderr in the same format as results; a failure to write
/// them is ignored since there is nowhere left to report it.
pub fn print_error<W: Write>(w: &mut W, message: &str, json: bool) {
    let _ = if json {
        write_json(w, &serde_json::json!({ "error": message }))
    } else {
        writeln!(w, "error: {message}")
    };
}

pub fn print_entry<W: Write>(w: &mut W, entry: &Entry, json: bool) -> io::Result<()> {
    if json {
        return write_json(w, entry);
    }
    writeln!(w, "type: {}", entry.kind.as_str())?;
    writeln!(w, "path: {}", entry.path)?;
    writeln!(w, "sha: {}", entry.sha)?;
    writeln!(w, "size: {}", entry.size)?;
    if let Some(url) = &entry.download_url {
        writeln!(w, "download_url: {url}")?;
    }
    Ok(())
}

pub fn print_entries<W: Write>(w: &mut W, entries: &[Entry], json: bool) -> io::Result<()> {
    if json {
        return write_json(w, entries);
    }
    for entry in entries {
        writeln!(w, "{}\t{}", entry.kind.as_str(), entry.path)?;
    }
    Ok(())
}

pub fn print_mutation<W: Write>(w: &mut W, result: &MutationResult, json: bool) -> io::Result<()> {
    if json {
        return write_json(w, result);
    }
    writeln!(w, "action: {}", result.action.as_str())?;
    writeln!(w, "path: {}", result.path)?;
    writeln!(w, "sha: {}", result.sha)?;
    if let Some(branch) = &result.branch {
        writeln!(w, "branch: {branch}")?;
    }
    Ok(())
}
