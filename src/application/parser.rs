//! Line scanner for the section/key configuration format.
//!
//! ```text
//! [server]            # open a section ( <server> works too )
//!     port = 8080     # leaf: key = value
//!     name = "a[1]"   # quotes protect '[' and '<'
//! [!server]           # close it ( [/server] works too )
//! ```
//!
//! The scanner keeps a cursor on the innermost open section: an opening tag
//! pushes a child section and moves into it, a closing tag moves back to the
//! parent. Several tags and keys may share a line.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, instrument, trace};

use crate::application::error::{ParseError, ParseErrorKind};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{ConfigTree, SectionId};

/// Parses in-memory text into a fresh tree.
#[instrument(level = "debug", skip(content))]
pub fn parse_str(filename: &str, content: &str) -> Result<ConfigTree, ParseError> {
    let mut parser = Parser::new(filename);
    for line in content.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parses a line-oriented stream into a fresh tree.
#[instrument(level = "debug", skip(reader))]
pub fn parse_reader<R: BufRead>(filename: &str, reader: R) -> ApplicationResult<ConfigTree> {
    let mut parser = Parser::new(filename);
    for line in reader.lines() {
        let line = line.with_path_context("read", Path::new(filename))?;
        parser.feed_line(&line)?;
    }
    Ok(parser.finish()?)
}

/// Incremental parser state: the tree under construction and the cursor.
pub struct Parser {
    filename: String,
    tree: ConfigTree,
    cursor: SectionId,
    line_no: usize,
    last_line_width: usize,
}

impl Parser {
    pub fn new(filename: &str) -> Self {
        let tree = ConfigTree::new();
        let cursor = tree.root();
        Self {
            filename: filename.to_string(),
            tree,
            cursor,
            line_no: 0,
            last_line_width: 0,
        }
    }

    /// Scans one line (without its terminator).
    pub fn feed_line(&mut self, raw: &str) -> Result<(), ParseError> {
        self.line_no += 1;
        self.last_line_width = raw.chars().count();

        let mut rest = raw.trim_start();
        while let Some(c) = rest.chars().next() {
            let column = raw[..raw.len() - rest.len()].chars().count() + 1;
            rest = match c {
                '#' => {
                    self.comment(&rest[1..]);
                    ""
                }
                '[' | '<' => self.tag(rest, column)?,
                c if c.is_whitespace() => &rest[c.len_utf8()..],
                _ => self.leaf(rest),
            };
        }
        Ok(())
    }

    /// Checks that every section was closed and hands out the tree.
    pub fn finish(self) -> Result<ConfigTree, ParseError> {
        if self.cursor != self.tree.root() {
            let name = self.current_name();
            return Err(self.error(
                self.last_line_width + 1,
                ParseErrorKind::UnclosedSection { name },
            ));
        }
        debug!("parsed {} nodes from {}", self.tree.len(), self.filename);
        Ok(self.tree)
    }

    fn comment(&mut self, text: &str) {
        let text = text.trim();
        trace!("line {}: comment {:?}", self.line_no, text);
        self.tree.create_comment(self.cursor, text, Some(self.line_no));
    }

    /// Handles `[name]`, `[!name]` or `[/name]` at the start of `rest`.
    fn tag<'a>(&mut self, rest: &'a str, column: usize) -> Result<&'a str, ParseError> {
        let end = rest
            .find(']')
            .or_else(|| rest.find('>'))
            .ok_or_else(|| self.error(column, ParseErrorKind::MalformedTag))?;
        let name = &rest[1..end];
        if name.is_empty() {
            return Err(self.error(column, ParseErrorKind::EmptyTagName));
        }

        if let Some(closing) = name.strip_prefix(&['/', '!'][..]) {
            self.close(closing, column)?;
        } else {
            trace!("line {}: open [{}]", self.line_no, name);
            self.cursor = self
                .tree
                .create_section(self.cursor, name, Some(self.line_no));
        }
        Ok(&rest[end + 1..])
    }

    fn close(&mut self, name: &str, column: usize) -> Result<(), ParseError> {
        let Some(parent) = self.tree.parent_section(self.cursor) else {
            return Err(self.error(
                column,
                ParseErrorKind::UnexpectedClosingTag {
                    found: name.to_string(),
                },
            ));
        };
        let expected = self.current_name();
        if name != expected {
            return Err(self.error(
                column,
                ParseErrorKind::MismatchedClosingTag {
                    expected,
                    found: name.to_string(),
                },
            ));
        }
        trace!("line {}: close [{}]", self.line_no, name);
        self.cursor = parent;
        Ok(())
    }

    /// Captures `key = value` up to the next unquoted `[` or `<`.
    fn leaf<'a>(&mut self, rest: &'a str) -> &'a str {
        let mut captured = String::new();
        let mut in_string = false;
        let mut end = rest.len();

        for (i, c) in rest.char_indices() {
            if !in_string && (c == '[' || c == '<') {
                end = i;
                break;
            }
            if c == '"' {
                in_string = !in_string;
                continue;
            }
            captured.push(c);
        }

        let (name, value) = match captured.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (captured.trim(), ""),
        };
        trace!("line {}: leaf {} = {:?}", self.line_no, name, value);
        self.tree
            .create_leaf(self.cursor, name, value, Some(self.line_no));

        &rest[end..]
    }

    fn current_name(&self) -> String {
        self.tree
            .section(self.cursor)
            .map(|node| node.name().to_string())
            .unwrap_or_default()
    }

    fn error(&self, column: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            filename: self.filename.clone(),
            line: self.line_no,
            column,
            kind,
        }
    }
}
