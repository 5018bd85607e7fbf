//! Path representation and the chroot path grammar.
//!
//! `Path` is an immutable, forkable builder: `push` returns a new `Path`
//! rather than mutating a shared buffer, because recursive comparator walks
//! fork a path at every branch and a shared buffer would have to be undone
//! on the way back up.

use crate::error::ChrootErrorReason;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res},
    sequence::{delimited, tuple},
};

/// One step in a path: a mapping key, or a list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Segment::Key(value.to_string())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Segment::Key(value)
    }
}

impl From<usize> for Segment {
    fn from(value: usize) -> Self {
        Segment::Index(value)
    }
}

/// An immutable dot-notation path, as used by the comparator, the sorter,
/// the filter, and the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn push(&self, segment: impl Into<Segment>) -> Self {
        let mut copy = self.0.clone();
        copy.push(segment.into());
        Path(copy)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        let mut copy = self.0.clone();
        copy.pop();
        Some(Path(copy))
    }

    /// Renders the path per the stable encoding in spec §6: map keys joined
    /// by `.`, list items as `<identifier>` or `<index>`, empty is root.
    /// The leading segment never gets a separator; every segment after it
    /// does, regardless of whether it's a key or an index.
    pub fn to_dot_string(&self) -> String {
        let mut buf = String::new();
        for segment in &self.0 {
            if !buf.is_empty() {
                buf.push('.');
            }
            match segment {
                Segment::Key(k) => buf.push_str(k),
                Segment::Index(i) => buf.push_str(&i.to_string()),
            }
        }
        buf
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dot_string())
    }
}

/// A single chroot grammar segment, before it's been applied to a value.
/// Kept distinct from `Segment` because `key[N]` is two navigation steps
/// (a key lookup, then an index) bundled into one grammar production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChrootSegment {
    Key(String),
    Index(usize),
    KeyIndex(String, usize),
}

/// Parses a chroot path per the grammar in spec §4.3:
///
/// ```text
/// path     = segment ( "." segment )*
/// segment  = key | key "[" digit+ "]" | "[" digit+ "]"
/// ```
///
/// Leading, trailing, and consecutive dots are no-ops rather than producing
/// empty segments.
pub fn parse_chroot_path(input: &str) -> Result<Vec<ChrootSegment>, ChrootErrorReason> {
    let mut segments = Vec::new();
    for raw in input.split('.') {
        if raw.is_empty() {
            continue;
        }
        let (_, segment) = all_consuming(chroot_segment)
            .parse(raw)
            .map_err(|_| ChrootErrorReason::Syntax(raw.to_string()))?;
        segments.push(segment);
    }
    Ok(segments)
}

fn chroot_segment(input: &str) -> IResult<&str, ChrootSegment> {
    alt((
        map(tuple((key_chars, bracket_index)), |(key, index)| {
            ChrootSegment::KeyIndex(key.to_string(), index)
        }),
        map(bracket_index, ChrootSegment::Index),
        map(key_chars, |key| ChrootSegment::Key(key.to_string())),
    ))
    .parse(input)
}

fn key_chars(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != '[' && c != ']')(input)
}

fn bracket_index(input: &str) -> IResult<&str, usize> {
    delimited(char('['), map_res(digit1, str::parse::<usize>), char(']')).parse(input)
}
