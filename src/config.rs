use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

/// Runtime settings, read from `BANKROLL_*` environment variables
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub log_json: bool,
    /// Buy-in the session form starts from
    pub default_buy_in: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: PathBuf::from("bankroll.db"),
            log_json: false,
            default_buy_in: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Malformed values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind: parse_or(lookup("BANKROLL_BIND"), defaults.bind),
            db_path: lookup("BANKROLL_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_json: lookup("BANKROLL_LOG_JSON")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.log_json),
            default_buy_in: parse_or(lookup("BANKROLL_DEFAULT_BUY_IN"), defaults.default_buy_in).max(0),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
