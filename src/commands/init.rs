// `init`: record how to reach a repository with ghrepo in the project's
// AGENTS.md, inside a marked block so reruns are no-ops.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::error::CliError;
use crate::repo::RepoSlug;

pub const AGENTS_FILE: &str = "AGENTS.md";
const BLOCK_START: &str = "<!-- GHREPO:START -->";
const BLOCK_END: &str = "<!-- GHREPO:END -->";

#[derive(Args)]
pub struct InitArgs {
    /// Repository as owner/name
    repo: String,
    /// Directory holding AGENTS.md (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Appended,
    AlreadyPresent,
}

fn agents_block(repo: &RepoSlug) -> String {
    format!(
        "{BLOCK_START}
# ghrepo

This project reads and writes the repository {repo} through ghrepo.

## Commands

```bash
ghrepo ls {repo} .                              # list a directory
ghrepo ls {repo} <dir> --recursive              # list a whole subtree
ghrepo cat {repo} <path>                        # print a file
ghrepo stat {repo} <path>                       # show metadata
ghrepo get {repo} <path> --out <local-path>     # download a file or directory
ghrepo put {repo} <path> -m \"msg\" --file <f>    # create or update a file
ghrepo rm {repo} <path> -m \"msg\"                # delete a file
```
{BLOCK_END}"
    )
}

/// New AGENTS.md content, or `None` when the block is already there.
pub fn merge_agents_block(existing: Option<&str>, repo: &RepoSlug) -> Option<String> {
    let block = agents_block(repo);
    match existing {
        None => Some(format!("{block}\n")),
        Some(content) if content.contains(BLOCK_START) => None,
        Some(content) => {
            let mut merged = content.to_string();
            if !merged.is_empty() && !merged.ends_with('\n') {
                merged.push('\n');
            }
            merged.push('\n');
            merged.push_str(&block);
            merged.push('\n');
            Some(merged)
        }
    }
}

/// Create or extend `dir/AGENTS.md`.
pub fn write_agents_file(dir: &Path, repo: &RepoSlug) -> Result<InitOutcome, CliError> {
    let path = dir.join(AGENTS_FILE);
    let existing = match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(CliError::local_write(format!("failed to read {}", path.display())).with_source(e));
        }
    };

    let Some(merged) = merge_agents_block(existing.as_deref(), repo) else {
        return Ok(InitOutcome::AlreadyPresent);
    };
    fs::write(&path, merged)
        .map_err(|e| CliError::local_write(format!("failed to write {}", path.display())).with_source(e))?;

    Ok(if existing.is_some() {
        InitOutcome::Appended
    } else {
        InitOutcome::Created
    })
}

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let repo = RepoSlug::parse(&args.repo)?;
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| CliError::local_write("failed to get current directory").with_source(e))?,
    };

    match write_agents_file(&dir, &repo)? {
        InitOutcome::Created => eprintln!("created {AGENTS_FILE} for {repo}"),
        InitOutcome::Appended => eprintln!("appended ghrepo configuration to {AGENTS_FILE} for {repo}"),
        InitOutcome::AlreadyPresent => eprintln!("{AGENTS_FILE} already contains ghrepo configuration, skipping"),
    }
    Ok(())
}
