//! Dependency arcs: `label(head, dependent)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sexpr::parse_arc;
use crate::tokenizer::Token;

/// Pseudo-token at the bottom of the parser stack; head of the `root` arc.
pub const ROOT: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationLabel {
    Nsubj,
    Root,
    ToLoc,
    FromLoc,
    At,
    AtTime,
    WhTime,
    Which,
    Nmod,
    Det,
    Aux,
    Discourse,
    Question,
    Punctuation,
}

impl RelationLabel {
    pub const ALL: [RelationLabel; 14] = [
        RelationLabel::Nsubj,
        RelationLabel::Root,
        RelationLabel::ToLoc,
        RelationLabel::FromLoc,
        RelationLabel::At,
        RelationLabel::AtTime,
        RelationLabel::WhTime,
        RelationLabel::Which,
        RelationLabel::Nmod,
        RelationLabel::Det,
        RelationLabel::Aux,
        RelationLabel::Discourse,
        RelationLabel::Question,
        RelationLabel::Punctuation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationLabel::Nsubj => "nsubj",
            RelationLabel::Root => "root",
            RelationLabel::ToLoc => "to-loc",
            RelationLabel::FromLoc => "from-loc",
            RelationLabel::At => "at",
            RelationLabel::AtTime => "at-time",
            RelationLabel::WhTime => "wh-time",
            RelationLabel::Which => "which",
            RelationLabel::Nmod => "nmod",
            RelationLabel::Det => "det",
            RelationLabel::Aux => "aux",
            RelationLabel::Discourse => "discourse",
            RelationLabel::Question => "question",
            RelationLabel::Punctuation => "punctuation",
        }
    }

    /// A right arc with this label closes the clause.
    pub fn ends_clause(self) -> bool {
        matches!(self, RelationLabel::Question | RelationLabel::Punctuation)
    }
}

impl fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArcParseError {
    #[error("unknown relation label `{0}`")]
    UnknownLabel(String),
    #[error("expected `label(head, dependent)`, found `{0}`")]
    Shape(String),
}

impl FromStr for RelationLabel {
    type Err = ArcParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationLabel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| ArcParseError::UnknownLabel(s.to_string()))
    }
}

/// A directed, labelled relation between a head token and a dependent token.
///
/// The same shape serves as a produced arc and as a permitted bank entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyArc {
    pub head: Token,
    pub dependent: Token,
    pub label: RelationLabel,
}

impl DependencyArc {
    pub fn new(head: impl Into<Token>, dependent: impl Into<Token>, label: RelationLabel) -> Self {
        Self {
            head: head.into(),
            dependent: dependent.into(),
            label,
        }
    }

    pub fn root(verb: impl Into<Token>) -> Self {
        Self::new(ROOT, verb, RelationLabel::Root)
    }

    pub fn is_root(&self) -> bool {
        self.label == RelationLabel::Root && self.head == ROOT
    }
}

impl fmt::Display for DependencyArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.label, self.head, self.dependent)
    }
}

impl FromStr for DependencyArc {
    type Err = ArcParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arc = parse_arc(s).map_err(|_| ArcParseError::Shape(s.to_string()))?;
        Ok(DependencyArc::new(arc.head, arc.dependent, arc.label.parse()?))
    }
}
