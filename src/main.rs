use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use studymate_channels::CliChannel;
use studymate_core::{Config, SessionState, StudyApp, StudyEngine};

#[derive(Parser)]
#[command(
    name = "studymate",
    version,
    about = "Load a document and ask questions about it"
)]
struct Cli {
    /// Config file (defaults to $STUDYMATE_CONFIG, then config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session (default)
    Chat {
        /// Document to process before the first prompt
        #[arg(long)]
        document: Option<PathBuf>,
        /// Do not read or write the prompt history file
        #[arg(long)]
        no_history: bool,
    },
    /// Process a document, answer one question and exit
    Ask {
        #[arg(long)]
        document: PathBuf,
        #[arg(required = true)]
        question: Vec<String>,
    },
    /// Serve sessions over HTTP
    #[cfg(feature = "gateway")]
    Serve,
}

const LOG_FILE: &str = "studymate.log";
const HISTORY_FILE: &str = ".studymate_history";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Chat {
        document: None,
        no_history: false,
    });

    // The chat prompt owns the terminal; keep log lines out of it.
    let log_to_file = matches!(command, Command::Chat { .. });
    init_subscriber(log_to_file.then_some(Path::new(LOG_FILE)));

    let config_path = resolve_config_path(cli.config);
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let engine = StudyEngine::new(&config);

    match command {
        Command::Chat {
            document,
            no_history,
        } => run_chat(engine, document.as_deref(), no_history).await,
        Command::Ask { document, question } => run_ask(&engine, &document, &question.join(" ")).await,
        #[cfg(feature = "gateway")]
        Command::Serve => run_gateway(&config).await,
    }
}

async fn run_chat(engine: StudyEngine, document: Option<&Path>, no_history: bool) -> anyhow::Result<()> {
    let channel = match history_path() {
        Some(path) if !no_history => CliChannel::with_history_file(&path),
        _ => CliChannel::new(),
    };
    let mut app = StudyApp::new(engine, channel);

    println!("StudyMate: Type /open <path> to load a PDF, /help for commands.");
    if let Some(path) = document {
        app.open(path).await?;
    }
    app.run().await?;
    tracing::info!("chat session ended");
    Ok(())
}

async fn run_ask(engine: &StudyEngine, document: &Path, question: &str) -> anyhow::Result<()> {
    let mut state = SessionState::new();
    if let Err(e) = engine.process_path(&mut state, document).await {
        eprintln!("{}", e.user_message());
        return Err(e).with_context(|| format!("failed to process {}", document.display()));
    }

    match engine.ask(&state, question) {
        Ok(answer) => println!("{}", answer.text()),
        Err(e) => println!("{}", e.user_message()),
    }
    Ok(())
}

#[cfg(feature = "gateway")]
async fn run_gateway(config: &Config) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    studymate_gateway::GatewayServer::from_config(config, shutdown_rx)
        .serve()
        .await?;
    Ok(())
}

fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_path {
        return path;
    }
    if let Ok(path) = std::env::var("STUDYMATE_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}

fn init_subscriber(log_file: Option<&Path>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(path) = log_file {
        match std::fs::File::create(path) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(file)
                    .with_ansi(false)
                    .init();
                return;
            }
            Err(e) => eprintln!("cannot open {}: {e}, logging to stderr", path.display()),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_chat() {
        let cli = Cli::try_parse_from(["studymate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_parses_ask() {
        let cli = Cli::try_parse_from([
            "studymate",
            "--config",
            "custom.toml",
            "ask",
            "--document",
            "notes.pdf",
            "what",
            "is",
            "paging",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Some(Command::Ask { document, question }) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(document, PathBuf::from("notes.pdf"));
        assert_eq!(question.join(" "), "what is paging");
    }

    #[test]
    fn cli_ask_requires_question() {
        assert!(Cli::try_parse_from(["studymate", "ask", "--document", "a.pdf"]).is_err());
    }

    #[test]
    fn explicit_config_path_wins() {
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("mine.toml"))),
            PathBuf::from("mine.toml")
        );
    }

    #[tokio::test]
    async fn ask_fails_on_unreadable_document() {
        let engine = StudyEngine::default();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert!(run_ask(&engine, &missing, "anything").await.is_err());
    }

    #[tokio::test]
    async fn ask_succeeds_on_text_document() {
        let engine = StudyEngine::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Compilers\nLexing and parsing").unwrap();
        run_ask(&engine, &path, "what is the title").await.unwrap();
    }
}
