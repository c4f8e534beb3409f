//! Statement kinds and SQL classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of SQL statement tracked by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Number of variants (for bucket sizing).
    pub const COUNT: usize = 4;

    /// All kinds in evaluation order.
    pub const ALL: [StatementKind; Self::COUNT] = [
        StatementKind::Select,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
    ];

    /// Upper-case SQL keyword for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }

    /// Bucket index of this kind.
    pub const fn index(self) -> usize {
        match self {
            StatementKind::Select => 0,
            StatementKind::Insert => 1,
            StatementKind::Update => 2,
            StatementKind::Delete => 3,
        }
    }

    /// Classifies raw SQL text by its leading verb.
    ///
    /// Leading whitespace, comments and opening parentheses are skipped. A
    /// `WITH` prefix resolves to the first statement verb found outside the
    /// common table expressions. `REPLACE` counts as an insert.
    ///
    /// Returns `None` for anything that is not a select, insert, update or
    /// delete (DDL, `PRAGMA`, transaction control, empty input).
    pub fn classify(sql: &str) -> Option<Self> {
        let mut words = Words::new(sql);
        let (first, _) = words.next()?;

        if first.eq_ignore_ascii_case("with") {
            return words
                .filter(|(_, depth)| *depth == 0)
                .find_map(|(word, _)| Self::from_keyword(word));
        }

        Self::from_keyword(first)
    }

    fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("select") {
            Some(StatementKind::Select)
        } else if word.eq_ignore_ascii_case("insert") || word.eq_ignore_ascii_case("replace") {
            Some(StatementKind::Insert)
        } else if word.eq_ignore_ascii_case("update") {
            Some(StatementKind::Update)
        } else if word.eq_ignore_ascii_case("delete") {
            Some(StatementKind::Delete)
        } else {
            None
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Iterator over bare words of a SQL string with their parenthesis depth.
///
/// Comments, string literals and quoted identifiers never yield words.
struct Words<'a> {
    sql: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Words<'a> {
    fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0, depth: 0 }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.sql.as_bytes().get(self.pos + ahead).copied()
    }

    fn skip_line_comment(&mut self) {
        let bytes = self.sql.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        let bytes = self.sql.as_bytes();
        self.pos += 2;
        while self.pos < bytes.len() {
            if bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Skips a quoted section. A doubled closing quote is an escape.
    fn skip_quoted(&mut self, close: u8) {
        let bytes = self.sql.as_bytes();
        self.pos += 1;
        while self.pos < bytes.len() {
            if bytes[self.pos] == close {
                if self.peek(1) == Some(close) {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return;
            }
            self.pos += 1;
        }
    }
}

impl<'a> Iterator for Words<'a> {
    type Item = (&'a str, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let sql = self.sql;
        let bytes = sql.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'-' if self.peek(1) == Some(b'-') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                quote @ (b'\'' | b'"' | b'`') => self.skip_quoted(quote),
                b'[' => self.skip_quoted(b']'),
                b'(' => {
                    self.depth += 1;
                    self.pos += 1;
                }
                b')' => {
                    self.depth = self.depth.saturating_sub(1);
                    self.pos += 1;
                }
                b if b.is_ascii_alphabetic() || b == b'_' => {
                    let start = self.pos;
                    while self.pos < bytes.len()
                        && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
                    {
                        self.pos += 1;
                    }
                    return Some((&sql[start..self.pos], self.depth));
                }
                _ => self.pos += 1,
            }
        }
        None
    }
}
