//! Page text -> single cleaned document string.

use crate::{Document, DocumentError, ExtractedDocument};

/// Line boundaries recognised when re-flowing extracted text.
///
/// `\r\n` needs no special case: splitting on `\r` and `\n` separately only
/// yields an extra blank line, and blank lines are dropped.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Unicode whitespace plus the `\x1c`..=`\x1f` information separators.
fn is_strip_char(c: char) -> bool {
    c.is_whitespace() || ('\x1c'..='\x1f').contains(&c)
}

/// Join page texts, trim every line, drop blank lines, and rejoin with `\n`.
///
/// Pages without text are skipped. Line order is preserved.
///
/// # Errors
///
/// Returns [`DocumentError::EmptyDocument`] when no non-blank line remains.
pub fn normalize_pages<S: AsRef<str>>(pages: &[S]) -> Result<String, DocumentError> {
    let mut out = String::new();
    for line in pages
        .iter()
        .map(AsRef::as_ref)
        .filter(|page| !page.is_empty())
        .flat_map(|page| page.split(is_line_boundary))
        .map(|line| line.trim_matches(is_strip_char))
        .filter(|line| !line.is_empty())
    {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }

    if out.is_empty() {
        return Err(DocumentError::EmptyDocument);
    }
    Ok(out)
}

/// Normalize an extracted document, carrying its metadata over.
///
/// # Errors
///
/// Returns [`DocumentError::EmptyDocument`] when no non-blank line remains.
pub fn normalize(extracted: ExtractedDocument) -> Result<Document, DocumentError> {
    let content = normalize_pages(&extracted.pages)?;
    Ok(Document {
        content,
        metadata: extracted.metadata,
    })
}
