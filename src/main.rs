use ragchat::cli::{parse_args, version_line, CliCommand, TerminalRenderer, USAGE};
use ragchat::client::ChatClient;
use ragchat::config::ClientConfig;
use ragchat::models::{Author, Message};

use color_eyre::Result;

/// Exit status after Ctrl-C, as shells report for SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

fn main() -> Result<()> {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("ragchat: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match args.command {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    color_eyre::install()?;
    init_tracing(args.verbose);

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    let client = ChatClient::new(config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let code = runtime.block_on(run(&client, args.command))?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Install the log subscriber. Logs go to stderr so stdout carries only the
/// answer; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "ragchat=debug" } else { "ragchat=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(client: &ChatClient, command: CliCommand) -> Result<i32> {
    match command {
        CliCommand::Stream {
            conversation_id,
            message,
        } => stream(client, &conversation_id, &message).await,
        CliCommand::NewConversation { message } => {
            let created = client.create_conversation().await?;
            eprintln!("conversation: {}", created.conversation_id);
            stream(client, &created.conversation_id, &message).await
        }
        CliCommand::History { conversation_id } => {
            let messages = client.fetch_messages(&conversation_id).await?;
            print_history(&messages);
            Ok(0)
        }
        CliCommand::Version | CliCommand::Help => Ok(0),
    }
}

/// Stream one answer to the terminal. Returns the process exit status.
async fn stream(client: &ChatClient, conversation_id: &str, message: &str) -> Result<i32> {
    let renderer = TerminalRenderer::new(std::io::stdout(), std::io::stderr());
    let session = client.stream_message(conversation_id, message, renderer);

    let close = session.close_handle();
    // Ignore errors if a handler is already installed
    let _ = ctrlc::set_handler(move || close.close());

    match session.completion().await {
        Ok(_) => Ok(0),
        Err(e) if e.is_cancelled() => Ok(EXIT_INTERRUPTED),
        // Already reported by the renderer
        Err(_) => Ok(1),
    }
}

fn print_history(messages: &[Message]) {
    for message in messages {
        let who = match message.author {
            Author::Agent => "agent",
            Author::User => "user",
            Author::Unknown => "?",
        };
        let when = message
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----------------".to_string());
        println!("[{}] {}: {}", when, who, message.content);
        for source in &message.cited_sources {
            println!("    - {}", source.title);
        }
    }
}
