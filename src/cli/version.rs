//! Version display for the ragchat CLI.

/// The current version of ragchat, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Text printed by `--version`.
pub fn version_line() -> String {
    format!("ragchat {}", VERSION)
}
