//! CLI module for ragchat.
//!
//! Argument parsing, version display and terminal rendering for the
//! `ragchat` binary.

pub mod args;
pub mod render;
pub mod version;

pub use args::{parse_args, ArgsError, CliArgs, CliCommand};
pub use render::TerminalRenderer;
pub use version::{version_line, VERSION};

/// Usage text printed by `--help` and on argument errors.
pub const USAGE: &str = "\
Usage:
  ragchat [--base-url URL] [-v] <conversation-id> <message...>
  ragchat [--base-url URL] [-v] --new <message...>
  ragchat [--base-url URL] --history <conversation-id>
  ragchat --version

Environment:
  RAGCHAT_API_BASE_URL          API root (default http://localhost:8000/api/v1)
  RAGCHAT_CONNECT_TIMEOUT_SECS  connect timeout in seconds (default 10)
  RUST_LOG                      log filter, overrides -v";
