//! Single-line editor for the chat prompt.
//!
//! On a terminal the line is edited in raw mode with cursor movement and
//! prefix-filtered history; piped stdin falls back to plain line reads.

use std::io::{self, BufRead, IsTerminal, Write, stdout};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, ClearType},
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadLine {
    Line(String),
    Interrupted,
    Eof,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Edit,
    Submit,
    Interrupt,
    Eof,
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Text being edited plus the cursor, measured in chars.
#[derive(Debug, Default)]
struct EditBuffer {
    text: String,
    cursor: usize,
    /// History entry currently shown, if browsing.
    recalled: Option<usize>,
    /// What was typed before browsing started; also the history filter.
    draft: String,
}

impl EditBuffer {
    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn apply(&mut self, key: KeyEvent, history: &[String]) -> Step {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Step::Interrupt,
            KeyCode::Char('d') if ctrl => {
                if self.text.is_empty() {
                    return Step::Eof;
                }
                self.delete_forward();
            }
            KeyCode::Enter => return Step::Submit,
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Home => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Backspace if key.modifiers.contains(KeyModifiers::ALT) => {
                self.delete_word_back();
            }
            KeyCode::Backspace => self.delete_back(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Up => self.recall_older(history),
            KeyCode::Down => self.recall_newer(history),
            KeyCode::Char(c) if !ctrl => {
                let at = self.byte_at(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
            }
            _ => {}
        }
        Step::Edit
    }

    fn delete_back(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_at(self.cursor);
            self.text.remove(at);
        }
    }

    fn delete_forward(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_at(self.cursor);
            self.text.remove(at);
        }
    }

    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().take(self.cursor).collect();
        let mut start = chars.len();
        while start > 0 && !chars[start - 1].is_alphanumeric() {
            start -= 1;
        }
        while start > 0 && chars[start - 1].is_alphanumeric() {
            start -= 1;
        }
        let (from, to) = (self.byte_at(start), self.byte_at(self.cursor));
        self.text.drain(from..to);
        self.cursor = start;
    }

    fn matches(&self, entry: &str) -> bool {
        entry.starts_with(self.draft.as_str())
    }

    fn recall_older(&mut self, history: &[String]) {
        let end = match self.recalled {
            Some(i) => i,
            None => {
                self.draft.clone_from(&self.text);
                history.len()
            }
        };
        if let Some(i) = history[..end].iter().rposition(|e| self.matches(e)) {
            self.show(history, Some(i));
        }
    }

    fn recall_newer(&mut self, history: &[String]) {
        let Some(current) = self.recalled else {
            return;
        };
        let next = history[current + 1..]
            .iter()
            .position(|e| self.matches(e))
            .map(|offset| current + 1 + offset);
        self.show(history, next);
    }

    fn show(&mut self, history: &[String], entry: Option<usize>) {
        self.recalled = entry;
        match entry {
            Some(i) => self.text.clone_from(&history[i]),
            None => self.text = std::mem::take(&mut self.draft),
        }
        self.cursor = self.len();
    }

    fn cursor_column(&self, prompt: &str) -> u16 {
        let before: String = self.text.chars().take(self.cursor).collect();
        let col = prompt.width() + before.width();
        u16::try_from(col).unwrap_or(u16::MAX)
    }
}

fn redraw(prompt: &str, buffer: &EditBuffer) -> io::Result<()> {
    let mut out = stdout();
    write!(
        out,
        "\r{}{prompt}{}{}",
        terminal::Clear(ClearType::CurrentLine),
        buffer.text,
        cursor::MoveToColumn(buffer.cursor_column(prompt)),
    )?;
    out.flush()
}

fn finish_line() -> io::Result<()> {
    let mut out = stdout();
    write!(out, "\r\n")?;
    out.flush()
}

fn read_piped(prompt: &str) -> io::Result<ReadLine> {
    print!("{prompt}");
    stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(ReadLine::Eof);
    }
    Ok(ReadLine::Line(
        line.trim_end_matches(['\r', '\n']).to_owned(),
    ))
}

/// Read one line from stdin. Blocks; call from a blocking context.
pub fn read_line(prompt: &str, history: &[String]) -> io::Result<ReadLine> {
    if !io::stdin().is_terminal() {
        return read_piped(prompt);
    }

    let _raw = RawMode::enable()?;
    let mut buffer = EditBuffer::default();
    redraw(prompt, &buffer)?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match buffer.apply(key, history) {
            Step::Edit => redraw(prompt, &buffer)?,
            Step::Submit => {
                finish_line()?;
                return Ok(ReadLine::Line(buffer.text));
            }
            Step::Interrupt => {
                finish_line()?;
                return Ok(ReadLine::Interrupted);
            }
            Step::Eof => {
                finish_line()?;
                return Ok(ReadLine::Eof);
            }
        }
    }
}
