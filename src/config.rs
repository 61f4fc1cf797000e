// Runtime configuration, resolved once per invocation and passed by
// reference into every command.

use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const FALLBACK_TOKEN_ENV: &str = "GH_TOKEN";

#[derive(Clone)]
pub struct Config {
    pub token: Option<String>,
    pub api_base: String,
    /// Applied to every HTTP call individually.
    pub timeout: Duration,
    pub json: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            json: false,
            verbose: false,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("json", &self.json)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Resolve the token from the process environment.
/// Precedence: flag > `GITHUB_TOKEN` > `GH_TOKEN`.
pub fn resolve_token(flag: Option<&str>) -> Option<String> {
    resolve_token_with(flag, |key| std::env::var(key).ok())
}

/// Same as [`resolve_token`] with an explicit environment lookup.
/// Empty values count as unset.
pub fn resolve_token_with<F>(flag: Option<&str>, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    flag.map(str::to_string)
        .filter(|t| !t.is_empty())
        .or_else(|| lookup(TOKEN_ENV).filter(|t| !t.is_empty()))
        .or_else(|| lookup(FALLBACK_TOKEN_ENV).filter(|t| !t.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn flag_takes_precedence() {
        let lookup = env(&[(TOKEN_ENV, "env-github"), (FALLBACK_TOKEN_ENV, "env-gh")]);
        assert_eq!(resolve_token_with(Some("flag-token"), lookup).as_deref(), Some("flag-token"));
    }

    #[test]
    fn primary_env_beats_fallback() {
        let lookup = env(&[(TOKEN_ENV, "env-github"), (FALLBACK_TOKEN_ENV, "env-gh")]);
        assert_eq!(resolve_token_with(None, lookup).as_deref(), Some("env-github"));
    }

    #[test]
    fn falls_back_to_secondary_env() {
        let lookup = env(&[(FALLBACK_TOKEN_ENV, "env-gh")]);
        assert_eq!(resolve_token_with(None, lookup).as_deref(), Some("env-gh"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let lookup = env(&[(TOKEN_ENV, ""), (FALLBACK_TOKEN_ENV, "env-gh")]);
        assert_eq!(resolve_token_with(Some(""), lookup).as_deref(), Some("env-gh"));
    }

    #[test]
    fn absent_when_nothing_set() {
        assert_eq!(resolve_token_with(None, env(&[])), None);
    }

    #[test]
    fn debug_never_shows_token() {
        let config = Config {
            token: Some("ghp_secret".into()),
            ..Config::default()
        };
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }
}
