//! Source positions, ranges and links.
//!
//! Lines and columns are 1-based, matching the host editor. The zero
//! position `(0, 0)` stands for "no position".

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single point in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const ZERO: Position = Position { line: 0, column: 0 };

    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

/// A span of source text, as recorded by the tracer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Range {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_line, self.end_column)
    }

    /// Both ends are inclusive.
    pub fn contains_position(&self, position: Position) -> bool {
        self.start() <= position && position <= self.end()
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains_position(other.start()) && self.contains_position(other.end())
    }

    /// Whether any part of the range lies on `line`.
    pub fn covers_line(&self, line: u32) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A range anchored in a specific source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub file: String,
    pub range: Range,
}
