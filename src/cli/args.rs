//! Command-line argument parsing for the ragchat CLI.
//!
//! Flags may appear anywhere before the positional arguments. Everything
//! after the conversation id (or after `--new`) is joined into the message.

use thiserror::Error;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Stream a message into an existing conversation
    Stream {
        conversation_id: String,
        message: String,
    },
    /// Create a conversation, then stream a message into it
    NewConversation { message: String },
    /// Print the stored messages of a conversation
    History { conversation_id: String },
}

/// Command plus global options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: CliCommand,
    /// `--base-url` override
    pub base_url: Option<String>,
    /// `-v` / `--verbose`
    pub verbose: bool,
}

/// Errors from argument parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("missing conversation id")]
    MissingConversationId,

    #[error("missing message text")]
    MissingMessage,
}

/// Parse command-line arguments.
///
/// # Examples
///
/// ```
/// use ragchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ragchat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap().command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliArgs, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut base_url = None;
    let mut verbose = false;
    let mut new_conversation = false;
    let mut history = false;
    let mut positional = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if !positional.is_empty() {
            positional.push(arg);
            continue;
        }

        match arg.as_str() {
            "--version" | "-V" => return Ok(CliArgs::new(CliCommand::Version, base_url, verbose)),
            "--help" | "-h" => return Ok(CliArgs::new(CliCommand::Help, base_url, verbose)),
            "--verbose" | "-v" => verbose = true,
            "--new" => new_conversation = true,
            "--history" => history = true,
            "--base-url" => {
                base_url = Some(args.next().ok_or(ArgsError::MissingValue("--base-url"))?);
            }
            "--" => positional.extend(args.by_ref()),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(ArgsError::UnknownOption(flag.to_string()))
            }
            _ => positional.push(arg),
        }
    }

    let command = if history {
        let conversation_id = positional
            .into_iter()
            .next()
            .ok_or(ArgsError::MissingConversationId)?;
        CliCommand::History { conversation_id }
    } else if new_conversation {
        CliCommand::NewConversation {
            message: join_message(positional)?,
        }
    } else {
        let mut positional = positional.into_iter();
        let conversation_id = positional.next().ok_or(ArgsError::MissingConversationId)?;
        CliCommand::Stream {
            conversation_id,
            message: join_message(positional.collect())?,
        }
    };

    Ok(CliArgs::new(command, base_url, verbose))
}

impl CliArgs {
    fn new(command: CliCommand, base_url: Option<String>, verbose: bool) -> Self {
        Self {
            command,
            base_url,
            verbose,
        }
    }
}

fn join_message(words: Vec<String>) -> Result<String, ArgsError> {
    let message = words.join(" ");
    if message.trim().is_empty() {
        return Err(ArgsError::MissingMessage);
    }
    Ok(message)
}
