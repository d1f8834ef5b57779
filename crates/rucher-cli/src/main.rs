//! rucher - terminal assistant for Coin des Apiculteurs

mod config;
mod ui;

use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;

use rucher_chat::{ChatClient, FrameStream, Message, Role, client::ENDPOINT_ENV};
use rucher_session::{ChatSession, History, HttpTransport, Transport};
use rucher_tui::{Theme, widgets::ChatMessage};

/// rucher - assistant apicole du Coin des Apiculteurs
#[derive(Parser, Debug)]
#[command(name = "rucher")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat endpoint URL (overrides config and environment)
    #[arg(long)]
    endpoint: Option<String>,

    /// Bearer credential (overrides config and environment)
    #[arg(long)]
    api_key: Option<String>,

    /// Use the light theme
    #[arg(long)]
    light: bool,

    /// Run without reading or writing the stored conversation
    #[arg(long)]
    incognito: bool,

    /// Delete the stored conversation and exit
    #[arg(long)]
    clear_history: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Transport used when no endpoint is configured: every turn fails the
/// same way an unreachable endpoint would.
struct UnconfiguredTransport;

#[async_trait::async_trait]
impl Transport for UnconfiguredTransport {
    async fn open(&self, _window: Vec<Message>) -> rucher_chat::Result<FrameStream> {
        Err(rucher_chat::Error::MissingConfig(ENDPOINT_ENV))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("rucher=debug")
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Delete the stored conversation and exit
    if args.clear_history {
        let path = config::Config::history_path();
        match std::fs::remove_file(&path) {
            Ok(()) => println!("Conversation effacée."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                println!("Aucune conversation enregistrée.");
            }
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let config = config::Config::load();

    let endpoint = args.endpoint.clone().or_else(|| config.endpoint());
    let api_key = args.api_key.clone().or_else(|| config.api_key());
    let transport: Arc<dyn Transport> = match (endpoint, api_key) {
        (Some(endpoint), Some(api_key)) => {
            Arc::new(HttpTransport::new(ChatClient::new(endpoint, api_key)))
        }
        _ => {
            tracing::warn!("chat endpoint not configured; turns will fail with a network error");
            Arc::new(UnconfiguredTransport)
        }
    };

    let history = if args.incognito {
        History::ephemeral()
    } else {
        History::restore(config::Config::history_path())
    };

    let mut session = ChatSession::new(transport, history);
    let session_rx = session.subscribe();

    // The panel starts from the restored transcript
    let initial: Vec<ChatMessage> = session
        .history()
        .messages()
        .iter()
        .map(|m| match m.role {
            Role::User => ChatMessage::user(m.content.as_str()),
            Role::Assistant => ChatMessage::assistant(m.content.as_str()),
        })
        .collect();

    let (ui_tx, mut ui_rx) = mpsc::channel::<ui::UiMessage>(32);

    // The session runs on its own task; the panel mirrors it through
    // broadcast events, so collapsing the panel never interrupts a turn.
    let session_task = tokio::spawn(async move {
        while let Some(message) = ui_rx.recv().await {
            match message {
                ui::UiMessage::Submit(text) => session.send(&text).await,
                ui::UiMessage::Clear => session.clear(),
                ui::UiMessage::Quit => break,
            }
        }
    });

    let theme = if args.light || config.theme.as_deref() == Some("light") {
        Theme::light()
    } else {
        Theme::dark()
    };

    let state = ui::WidgetState::new(initial, theme, ui_tx);
    let result = ui::run_widget(state, session_rx).await;

    let _ = session_task.await;
    result
}
