//! Text-shape normalization for generated query statements.
//!
//! This is a heuristic pass for a fallible-but-cooperative generator, not an
//! injection-proof parser: beyond the keyword gate it never looks at query
//! grammar, only at text shape (fences, comments, whitespace, separators,
//! the row-bound clause).

use crate::extract;
use std::fmt;
use tracing::{debug, warn};

/// Row bound carried by the fallback statement.
const FALLBACK_ROWS: u32 = 100;

/// A single bounded query statement: no comment text, no separator,
/// exactly one row-bound clause, no trailing separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes raw generator text into a [`Statement`]. Total: unusable
/// input yields the fallback statement, never an error.
#[derive(Debug, Clone)]
pub struct StatementSanitizer {
    /// Table queried by the fallback statement.
    pub fallback_table: String,
    /// Row bound injected into statements that carry none.
    pub max_rows: u32,
}

impl Default for StatementSanitizer {
    fn default() -> Self {
        Self {
            fallback_table: "DUAL".to_string(),
            max_rows: 1000,
        }
    }
}

impl StatementSanitizer {
    pub fn new(fallback_table: impl Into<String>, max_rows: u32) -> Self {
        Self {
            fallback_table: fallback_table.into(),
            max_rows,
        }
    }

    /// The narrowly bounded statement used whenever the input is unusable.
    pub fn fallback(&self) -> Statement {
        Statement(format!(
            "SELECT * FROM {} FETCH FIRST {} ROWS ONLY",
            self.fallback_table, FALLBACK_ROWS
        ))
    }

    pub fn sanitize(&self, raw: &str) -> Statement {
        let text = match extract::fenced_sql(raw) {
            Some(inner) => {
                debug!("extracted statement from fenced code block");
                inner.trim()
            }
            None => raw,
        };

        if !text.to_uppercase().contains("SELECT") {
            warn!("generated text has no query keyword, using fallback statement");
            return self.fallback();
        }

        let text = strip_line_comments(text);
        let text = strip_block_comments(&text);

        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

        let text = match text.split_once(';') {
            Some((first, _)) => {
                debug!("kept only the first of multiple statements");
                first.trim().to_string()
            }
            None => text,
        };
        if text.is_empty() {
            warn!("nothing left before the first separator, using fallback statement");
            return self.fallback();
        }

        let text = if text.to_uppercase().contains("FETCH FIRST") {
            text
        } else {
            format!(
                "{} FETCH FIRST {} ROWS ONLY",
                text.trim_end_matches(';'),
                self.max_rows
            )
        };

        let statement = text.trim_end_matches(';').to_string();
        debug!("sanitized statement: {statement}");
        Statement(statement)
    }
}

/// Drops everything from `--` to the end of each line.
fn strip_line_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for (idx, line) in input.lines().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        match line.find("--") {
            Some(pos) => output.push_str(&line[..pos]),
            None => output.push_str(line),
        }
    }
    output
}

/// Drops terminated `/* ... */` spans. An unterminated opener is left
/// as-is rather than swallowing the rest of the text.
fn strip_block_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(end) => {
                output.push_str(&rest[..start]);
                rest = &rest[start + 2 + end + 2..];
            }
            None => break,
        }
    }
    output.push_str(rest);
    output
}
