use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};

use studymate_core::channel::{Channel, ChannelError, ChannelMessage};

use crate::line_editor::{self, ReadLine};

const PROMPT: &str = "You: ";
const MAX_HISTORY: usize = 500;

/// Prompt history, optionally mirrored to a file one entry per line.
#[derive(Debug, Default)]
struct InputHistory {
    entries: VecDeque<String>,
    file: Option<PathBuf>,
}

impl InputHistory {
    fn from_file(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => {
                let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
                let skip = lines.len().saturating_sub(MAX_HISTORY);
                lines[skip..].iter().map(|l| (*l).to_owned()).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => VecDeque::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read history: {e}");
                VecDeque::new()
            }
        };
        Self {
            entries,
            file: Some(path.to_path_buf()),
        }
    }

    fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    fn add(&mut self, line: &str) {
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() == MAX_HISTORY {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_owned());

        if let Some(path) = &self.file
            && let Err(e) = append_line(path, line)
        {
            tracing::warn!(path = %path.display(), "failed to save history: {e}");
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{line}")
}

/// Whether a submitted line ends the conversation.
fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit")
}

/// Chat over stdin/stdout.
#[derive(Debug, Default)]
pub struct CliChannel {
    history: InputHistory,
}

impl CliChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load prompt history from `path` and append new entries to it.
    #[must_use]
    pub fn with_history_file(path: &Path) -> Self {
        Self {
            history: InputHistory::from_file(path),
        }
    }
}

impl Channel for CliChannel {
    async fn recv(&mut self) -> Result<Option<ChannelMessage>, ChannelError> {
        let entries = self.history.snapshot();
        let result = tokio::task::spawn_blocking(move || line_editor::read_line(PROMPT, &entries))
            .await
            .map_err(|e| ChannelError::Other(e.to_string()))??;

        let line = match result {
            ReadLine::Interrupted | ReadLine::Eof => return Ok(None),
            ReadLine::Line(line) => line,
        };

        let trimmed = line.trim();
        if is_exit(trimmed) {
            return Ok(None);
        }
        self.history.add(trimmed);

        Ok(Some(ChannelMessage {
            text: trimmed.to_owned(),
        }))
    }

    async fn send(&mut self, text: &str) -> Result<(), ChannelError> {
        println!("StudyMate: {text}");
        Ok(())
    }

    async fn send_warning(&mut self, text: &str) -> Result<(), ChannelError> {
        println!("StudyMate: [!] {text}");
        Ok(())
    }

    async fn send_status(&mut self, text: &str) -> Result<(), ChannelError> {
        eprintln!("{text}");
        Ok(())
    }
}
