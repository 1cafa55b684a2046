//! Migration script statement splitting.
//!
//! Scripts are split line by line. A statement ends on the first line whose
//! trimmed text ends with the active delimiter (`;` by default). A line of the
//! form `-- delimiter <token>` switches the delimiter for the next statement
//! only, which lets function bodies carry internal semicolons.

use crate::error::{CoreError, CoreResult};

/// Terminator used when no directive is in effect.
pub const DEFAULT_DELIMITER: &str = ";";

const DIRECTIVE_KEYWORD: &str = "delimiter";

/// A migration script known to contain at least one statement.
///
/// Iterating a `Script` always starts from the first statement, so the same
/// script can be walked any number of times.
#[derive(Debug, Clone, Copy)]
pub struct Script<'a> {
    text: &'a str,
}

impl<'a> Script<'a> {
    /// Validate `text` as a script, failing with [`CoreError::EmptyScript`]
    /// when it holds nothing but blank lines and comments.
    pub fn parse(text: &'a str) -> CoreResult<Self> {
        if Statements::new(text).next().is_none() {
            return Err(CoreError::EmptyScript);
        }
        Ok(Self { text })
    }

    /// Statements in source order.
    pub fn statements(&self) -> Statements<'a> {
        Statements::new(self.text)
    }
}

impl<'a> IntoIterator for &Script<'a> {
    type Item = String;
    type IntoIter = Statements<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements()
    }
}

/// Split `text` into trimmed statements, delimiters stripped.
pub fn parse_statements(text: &str) -> CoreResult<Vec<String>> {
    Ok(Script::parse(text)?.statements().collect())
}

/// Lazy statement iterator over a script's lines.
#[derive(Debug, Clone)]
pub struct Statements<'a> {
    lines: std::str::Lines<'a>,
    buffer: String,
    delimiter: &'a str,
}

impl<'a> Statements<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            buffer: String::new(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Iterator for Statements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for line in self.lines.by_ref() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(token) = delimiter_directive(trimmed) {
                self.delimiter = token;
                continue;
            }
            if trimmed.starts_with("--") {
                continue;
            }

            self.buffer.push_str(trimmed);
            self.buffer.push(' ');

            if trimmed.ends_with(self.delimiter) {
                let delimiter = std::mem::replace(&mut self.delimiter, DEFAULT_DELIMITER);
                if let Some(stmt) = flush(&mut self.buffer, delimiter) {
                    return Some(stmt);
                }
            }
        }

        // Unterminated trailing statement
        flush(&mut self.buffer, self.delimiter)
    }
}

/// Drain `buffer` into a statement with `delimiter` stripped from its end.
fn flush(buffer: &mut String, delimiter: &str) -> Option<String> {
    let raw = std::mem::take(buffer);
    let raw = raw.trim_end();
    let stmt = raw.strip_suffix(delimiter).unwrap_or(raw).trim();
    (!stmt.is_empty()).then(|| stmt.to_string())
}

/// Recognize `-- delimiter <token>` and return the token.
fn delimiter_directive(line: &str) -> Option<&str> {
    let mut words = line.strip_prefix("--")?.split_whitespace();
    if words.next()? != DIRECTIVE_KEYWORD {
        return None;
    }
    let token = words.next()?;
    words.next().is_none().then_some(token)
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
