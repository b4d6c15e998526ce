use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use edurise_chat::voice::Unsupported;
use edurise_chat::{
    ChatSession, ChatUiController, Config, HttpTransport, Key, RelayServer, SendOutcome, Sender,
    SpeechInputManager, SpeechOutputManager, TerminalSurface, UiEvent, markdown,
};

/// EduRise chat assistant
#[derive(Parser)]
#[command(name = "edurise-chat", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant in the terminal
    Chat {
        /// Print answers as HTML instead of plain text
        #[arg(long)]
        html: bool,
    },
    /// Ask a single question and print the answer
    Ask {
        /// Question to ask
        query: String,
        /// Print the answer as HTML
        #[arg(long)]
        html: bool,
    },
    /// Render Markdown to HTML
    Render {
        /// Markdown file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Run the answering relay
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory of static widget assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
    /// Check that the answering endpoint is up
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,edurise_chat=info",
        1 => "info,edurise_chat=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Chat { html: false }) {
        Command::Chat { html } => chat(&config, html).await,
        Command::Ask { query, html } => ask(&config, &query, html).await,
        Command::Render { file } => render(file),
        Command::Serve { port, static_dir } => serve(config, port, static_dir).await,
        Command::Health => health(&config).await,
    }
}

/// Session on a terminal host: HTTP transport, no voice
fn build_session(config: &Config) -> anyhow::Result<ChatSession> {
    if config.speech.enabled {
        tracing::debug!("terminal host has no voice capture or synthesis");
    }

    let transport = HttpTransport::new(&config.chat)?;
    let input = SpeechInputManager::new(Box::new(Unsupported), &config.speech);
    let output = SpeechOutputManager::new(Box::new(Unsupported), &config.speech);

    Ok(ChatSession::new(
        Arc::new(transport),
        input,
        output,
        &config.widget,
    ))
}

/// Interactive terminal widget
async fn chat(config: &Config, html: bool) -> anyhow::Result<()> {
    let session = build_session(config)?;
    let (controller, events) =
        ChatUiController::initialize(TerminalSurface::stdout(html), session, &config.widget)?;
    let sender = controller.sender();
    let ui = tokio::spawn(controller.run(events));

    println!("EduRise assistant at {}", config.chat.endpoint);
    println!("Type a question, /toggle to open or close, /quit to leave.\n");
    sender.send(UiEvent::Toggle)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/toggle" => sender.send(UiEvent::Toggle)?,
            "/close" => sender.send(UiEvent::Key(Key::Escape))?,
            text => {
                sender.send(UiEvent::Input(text.to_string()))?;
                sender.send(UiEvent::Key(Key::Enter))?;
            }
        }
    }

    sender.send(UiEvent::Shutdown)?;
    let controller = ui.await?;
    tracing::debug!(
        messages = controller.session().messages().len(),
        "chat finished"
    );
    Ok(())
}

/// One exchange, answer on stdout
async fn ask(config: &Config, query: &str, html: bool) -> anyhow::Result<()> {
    let mut session = build_session(config)?;
    session.open();

    if session.submit(query).await == SendOutcome::Ignored {
        anyhow::bail!("query is empty");
    }

    let Some(reply) = session
        .messages()
        .iter()
        .rev()
        .find(|message| message.sender() == Sender::Bot)
    else {
        anyhow::bail!("no reply received");
    };

    if html {
        println!("{}", reply.rendered_html().unwrap_or_default());
    } else {
        println!("{}", reply.text());
    }
    Ok(())
}

/// Markdown from a file or stdin to HTML on stdout
fn render(file: Option<PathBuf>) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(&path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    println!("{}", markdown::render(&text));
    Ok(())
}

async fn serve(
    mut config: Config,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.relay.port = port;
    }
    if static_dir.is_some() {
        config.relay.static_dir = static_dir;
    }

    tracing::info!(
        port = config.relay.port,
        upstream = %config.relay.upstream_url,
        "starting answering relay"
    );
    RelayServer::from_config(&config.relay)?.run().await?;
    Ok(())
}

async fn health(config: &Config) -> anyhow::Result<()> {
    let transport = HttpTransport::new(&config.chat)?;
    if transport.health().await? {
        println!("ok: {}", config.chat.health_endpoint);
        Ok(())
    } else {
        anyhow::bail!("answering endpoint unhealthy: {}", config.chat.health_endpoint)
    }
}
