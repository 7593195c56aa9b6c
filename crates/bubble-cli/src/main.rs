//! bubble CLI: terminal chat client and one-shot chat commands

use bubble_engine::{
    run_chat, run_start, run_upload, ChatBackend, Config, Conversation, HttpBackend, SessionGate,
    SubmitOutcome, UploadFile, UploadStart,
};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Chat with a bubble backend from the terminal
#[derive(Parser)]
#[command(name = "bubble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: .bubble/config.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat UI (default when no command specified)
    Tui,

    /// Start a session, send one message and print the reply
    Send {
        /// Message text
        message: String,
    },

    /// Start a session, upload one .txt file and print the server's answer
    Upload {
        /// File to upload
        path: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Write the effective configuration to .bubble/config.json
        #[arg(long)]
        init: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    if let Err(e) = init_logging(cli.log_file.as_deref(), interactive) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

/// Install the tracing subscriber.
///
/// The chat UI owns the terminal, so without a log file its logs are
/// dropped. One-shot commands log to stderr.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let work_dir = std::env::current_dir()?;
    let mut config = Config::resolve(cli.config.as_deref(), &work_dir)?;
    if let Some(url) = &cli.api_base_url {
        config = config.with_api_base_url(url.clone())?;
    }
    debug!(
        api_base_url = %config.api_base_url,
        policy = %config.upload_policy,
        "configuration loaded"
    );
    Ok(config)
}

fn run(cli: Cli) -> Result<i32, Box<dyn Error>> {
    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Tui) => {
            let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config)?);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(bubble_tui::run_tui(config, backend))?;
            Ok(0)
        }
        Some(Commands::Send { message }) => {
            let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config)?);
            let rt = tokio::runtime::Runtime::new()?;
            Ok(print_reply(rt.block_on(send_message(&config, backend, &message))))
        }
        Some(Commands::Upload { path }) => {
            let backend: Arc<dyn ChatBackend> = Arc::new(HttpBackend::new(&config)?);
            let rt = tokio::runtime::Runtime::new()?;
            Ok(print_reply(rt.block_on(upload_path(&config, backend, path))))
        }
        Some(Commands::Config { init: true, .. }) => {
            let path = Config::default_path(&std::env::current_dir()?);
            init_config(&config, &path)?;
            println!("Wrote {}", path.display());
            Ok(0)
        }
        Some(Commands::Config { json, .. }) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", describe_config(&config));
            }
            Ok(0)
        }
    }
}

/// Open a session, skipping the cosmetic delay the UI shows.
async fn open_session(backend: &Arc<dyn ChatBackend>) -> bool {
    let mut gate = SessionGate::new();
    let Some(ticket) = gate.start() else {
        return gate.is_active();
    };
    let (ticket, result) = run_start(backend.clone(), ticket, Duration::ZERO).await;
    if let Err(e) = &result {
        eprintln!("Error: could not start a chat session: {e}");
    }
    gate.settle_start(ticket, result);
    gate.is_active()
}

/// Send one message and return the reply text.
///
/// `None` means the session never opened or there was nothing to send.
async fn send_message(
    config: &Config,
    backend: Arc<dyn ChatBackend>,
    message: &str,
) -> Option<String> {
    if !open_session(&backend).await {
        return None;
    }

    let mut conversation = Conversation::new(config.upload_policy);
    match conversation.submit(message) {
        SubmitOutcome::Dispatched(ticket) => {
            let (ticket, result) = run_chat(backend, ticket).await;
            conversation.settle_chat(ticket, result);
        }
        SubmitOutcome::Empty | SubmitOutcome::Busy => {
            eprintln!("Error: nothing to send");
            return None;
        }
    }

    last_text(&conversation)
}

/// Upload one file and return the acknowledgment, or the rejection notice
/// for files that are not `.txt`.
async fn upload_path(
    config: &Config,
    backend: Arc<dyn ChatBackend>,
    path: PathBuf,
) -> Option<String> {
    if !open_session(&backend).await {
        return None;
    }

    let mut conversation = Conversation::new(config.upload_policy);
    match conversation.upload_file(UploadFile::from_path(path)) {
        UploadStart::Dispatched { ticket, file } => {
            let (ticket, result) = run_upload(backend, ticket, file).await;
            conversation.settle_upload(ticket, result);
        }
        UploadStart::Rejected => {}
        UploadStart::Busy => {
            eprintln!("Error: another request is in flight");
            return None;
        }
    }

    last_text(&conversation)
}

fn last_text(conversation: &Conversation) -> Option<String> {
    conversation.log().last().map(|message| message.text.clone())
}

fn print_reply(reply: Option<String>) -> i32 {
    match reply {
        Some(text) => {
            println!("{text}");
            0
        }
        None => 1,
    }
}

/// Write `config` to `path`, refusing to overwrite an existing file.
fn init_config(config: &Config, path: &Path) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        return Err(format!("{} already exists", path.display()).into());
    }
    config.save(path)?;
    Ok(())
}

fn describe_config(config: &Config) -> String {
    let timeout = config
        .request_timeout_secs
        .map_or_else(|| "none".to_string(), |secs| format!("{secs}s"));
    format!(
        "apiBaseUrl:         {}\nstartDelayMs:       {}\nuploadPolicy:       {}\nrequestTimeoutSecs: {}\n",
        config.api_base_url, config.start_delay_ms, config.upload_policy, timeout
    )
}
