//! Environment variable parsing.
//!
//! Blank values are treated as unset so that `DAS_RPC_URL=` in a `.env` file
//! falls back to the default instead of producing an empty endpoint.

use std::str::FromStr;

fn non_blank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `key` into `T`; `None` when unset, blank, or unparsable.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    non_blank(key).and_then(|v| v.trim().parse().ok())
}

/// Parse `key` into `T`, falling back to `default`.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// True when `key` is one of `1`, `true`, `yes`, `on` (case-insensitive).
pub fn env_bool(key: &str) -> bool {
    non_blank(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// String value of `key`, falling back to `default`.
pub fn env_string_or(key: &str, default: &str) -> String {
    non_blank(key).unwrap_or_else(|| default.to_string())
}
