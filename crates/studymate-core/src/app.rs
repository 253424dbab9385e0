//! Conversation loop for single-user surfaces.

use std::path::{Path, PathBuf};

use crate::channel::{Channel, ChannelError};
use crate::engine::{Processed, StudyEngine};
use crate::error::StudyError;
use crate::session::SessionState;

pub const HELP_TEXT: &str = "\
Commands:
  /open <path>   process a PDF (or .txt/.md) document
  /summary       show the summary of the current document
  /help          show this help
  exit, quit     leave
Anything else is a question about the current document.";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Summary,
    Help,
    Ask(String),
}

impl Command {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("/open")
            && (rest.is_empty() || rest.starts_with(char::is_whitespace))
        {
            return Self::Open(PathBuf::from(rest.trim()));
        }
        match trimmed {
            "/summary" => Self::Summary,
            "/help" => Self::Help,
            _ => Self::Ask(line.to_owned()),
        }
    }
}

#[must_use]
pub fn processed_message(processed: &Processed) -> String {
    format!(
        "Processed {} ({} chunks).\n\nSummary:\n{}",
        processed.source, processed.chunks, processed.summary
    )
}

/// Owns one [`SessionState`] and drives it from a [`Channel`].
pub struct StudyApp<C: Channel> {
    engine: StudyEngine,
    state: SessionState,
    channel: C,
}

impl<C: Channel> StudyApp<C> {
    #[must_use]
    pub fn new(engine: StudyEngine, channel: C) -> Self {
        Self {
            engine,
            state: SessionState::new(),
            channel,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Process the document at `path` and report the outcome.
    ///
    /// Returns `true` if a new document was published. Load and processing
    /// failures are reported to the channel, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if the channel fails.
    pub async fn open(&mut self, path: &Path) -> Result<bool, ChannelError> {
        if path.as_os_str().is_empty() {
            self.channel.send_warning("Usage: /open <path>").await?;
            return Ok(false);
        }

        self.channel
            .send_status(&format!("Processing {}...", path.display()))
            .await?;
        match self.engine.process_path(&mut self.state, path).await {
            Ok(processed) => {
                self.channel.send(&processed_message(&processed)).await?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to process document: {e}");
                self.channel.send_warning(&e.user_message()).await?;
                Ok(false)
            }
        }
    }

    /// Answer `question` against the current document.
    ///
    /// # Errors
    ///
    /// Returns an error only if the channel fails.
    pub async fn ask(&mut self, question: &str) -> Result<(), ChannelError> {
        match self.engine.ask(&self.state, question) {
            Ok(answer) => self.channel.send(answer.text()).await,
            Err(e) => self.channel.send_warning(&e.user_message()).await,
        }
    }

    async fn summary(&mut self) -> Result<(), ChannelError> {
        match self.state.snapshot() {
            Some(loaded) => self.channel.send(loaded.summary()).await,
            None => {
                self.channel
                    .send_warning(&StudyError::NotReady.user_message())
                    .await
            }
        }
    }

    /// Handle one line of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if the channel fails.
    pub async fn handle(&mut self, line: &str) -> Result<(), ChannelError> {
        match Command::parse(line) {
            Command::Open(path) => self.open(&path).await.map(|_| ()),
            Command::Summary => self.summary().await,
            Command::Help => self.channel.send(HELP_TEXT).await,
            Command::Ask(question) => self.ask(&question).await,
        }
    }

    /// Read and handle lines until the channel closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel fails.
    pub async fn run(&mut self) -> Result<(), ChannelError> {
        while let Some(message) = self.channel.recv().await? {
            self.handle(&message.text).await?;
        }
        tracing::debug!("channel closed, leaving conversation loop");
        Ok(())
    }
}
