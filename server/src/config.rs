//! Server configuration loaded from environment variables with defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

const MAX_TTL_DAYS: i64 = 3650;

/// Runtime settings for the todo server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Directory served under `/public`
    pub public_dir: PathBuf,
    pub session: SessionConfig,
}

/// Session cookie and store settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// Lifetime of a session, refreshed on every request
    pub ttl: Duration,
    /// Whether the cookie is marked `Secure`
    pub secure: bool,
    /// JSON file backing the session store; in-memory when unset
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "todos-session-id".to_string(),
            ttl: Duration::days(31),
            secure: false,
            store_path: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let ttl_days = parse_or(lookup("SESSION_TTL_DAYS"), 31_i64);
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(lookup("PORT"), defaults.port),
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            session: SessionConfig {
                cookie_name: lookup("SESSION_COOKIE_NAME")
                    .filter(|name| !name.is_empty())
                    .unwrap_or(defaults.session.cookie_name),
                ttl: Duration::days(ttl_days.clamp(1, MAX_TTL_DAYS)),
                secure: parse_or(lookup("SESSION_COOKIE_SECURE"), defaults.session.secure),
                store_path: lookup("SESSION_STORE_PATH")
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
            },
        }
    }

    /// Address string for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_classic_setup() {
        let config = from_pairs(&[]);
        assert_eq!(config.bind_addr(), "localhost:3000");
        assert_eq!(config.session.cookie_name, "todos-session-id");
        assert_eq!(config.session.ttl, Duration::days(31));
        assert!(!config.session.secure);
        assert!(config.session.store_path.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = from_pairs(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("SESSION_TTL_DAYS", "7"),
            ("SESSION_COOKIE_SECURE", "true"),
            ("SESSION_STORE_PATH", "/tmp/sessions.json"),
        ]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.session.ttl, Duration::days(7));
        assert!(config.session.secure);
        assert_eq!(
            config.session.store_path.as_deref(),
            Some(std::path::Path::new("/tmp/sessions.json"))
        );
    }

    #[test]
    fn bad_values_fall_back_or_clamp() {
        let config = from_pairs(&[("PORT", "not-a-port"), ("SESSION_TTL_DAYS", "-3")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.session.ttl, Duration::days(1));
    }
}
