//! Escaping for `/.../`-delimited regex entry surfaces.
//!
//! The native pattern `^https?://a\.com$` is entered as
//! `/^https?:\/\/a\.com$/`.

use crate::error::EscapeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectEscaper {
    delimiter: char,
    escape: char,
}

impl Default for DialectEscaper {
    fn default() -> Self {
        Self {
            delimiter: '/',
            escape: '\\',
        }
    }
}

impl DialectEscaper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Escape every unescaped delimiter and wrap the result in delimiters
    pub fn escape(&self, pattern: &str) -> Result<String, EscapeError> {
        if self.is_delimited(pattern) {
            return Err(EscapeError::AlreadyDelimited {
                pattern: pattern.to_string(),
                delimiter: self.delimiter,
            });
        }

        let mut escaped = String::with_capacity(pattern.len() + 8);
        let mut prev = None;
        for ch in pattern.chars() {
            if ch == self.delimiter && prev != Some(self.escape) {
                escaped.push(self.escape);
            }
            escaped.push(ch);
            prev = Some(ch);
        }

        // `\\/` survives the single-char lookbehind above but is still unescaped
        if let Some(position) = self.find_unescaped(&escaped) {
            return Err(EscapeError::UnescapedSeparator {
                pattern: escaped,
                delimiter: self.delimiter,
                position,
            });
        }

        Ok(format!("{d}{escaped}{d}", d = self.delimiter))
    }

    /// Byte offset of the first delimiter preceded by an even run of escapes
    pub fn find_unescaped(&self, text: &str) -> Option<usize> {
        let mut run = 0usize;
        for (idx, ch) in text.char_indices() {
            if ch == self.delimiter && run % 2 == 0 {
                return Some(idx);
            }
            run = if ch == self.escape { run + 1 } else { 0 };
        }
        None
    }

    /// Starts and ends with an unescaped delimiter
    fn is_delimited(&self, pattern: &str) -> bool {
        let mut chars = pattern.chars();
        let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
            return false;
        };
        if first != self.delimiter || last != self.delimiter {
            return false;
        }

        let body = &pattern[..pattern.len() - last.len_utf8()];
        let trailing_escapes = body.chars().rev().take_while(|&c| c == self.escape).count();
        trailing_escapes % 2 == 0
    }
}

/// Escape with the default `/` delimiter
pub fn escape_for_delimited_dialect(pattern: &str) -> Result<String, EscapeError> {
    DialectEscaper::default().escape(pattern)
}
