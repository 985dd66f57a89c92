//! Grammatical relations → logical form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammatical::{GrammaticalRelation, RelationKind, CLAUSE, YES_NO};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum TermRole {
    Lsubj,
    ToLoc,
    FromLoc,
    AtTime,
    WhTime,
    Nmod,
}

impl TermRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TermRole::Lsubj => "LSUBJ",
            TermRole::ToLoc => "TO-LOC",
            TermRole::FromLoc => "FROM-LOC",
            TermRole::AtTime => "AT-TIME",
            TermRole::WhTime => "WH-TIME",
            TermRole::Nmod => "NMOD",
        }
    }

    fn from_kind(kind: RelationKind) -> Option<Self> {
        match kind {
            RelationKind::Lsubj => Some(TermRole::Lsubj),
            RelationKind::ToLoc => Some(TermRole::ToLoc),
            RelationKind::FromLoc => Some(TermRole::FromLoc),
            RelationKind::AtTime => Some(TermRole::AtTime),
            RelationKind::WhTime => Some(TermRole::WhTime),
            RelationKind::Nmod => Some(TermRole::Nmod),
            RelationKind::Pred | RelationKind::Which | RelationKind::Question => None,
        }
    }
}

/// Typed bracket term, e.g. `[TO-LOC HUẾ]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalTerm {
    pub role: TermRole,
    pub value: String,
}

impl fmt::Display for LogicalTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.role.as_str(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "kebab-case")]
pub enum LogicalItem {
    /// Quantifier over the head noun: `(m1 WHICH MÁY BAY)`.
    Which { clause: String, noun: String },
    /// `(m1 PRED ĐẾN [LSUBJ MÁY BAY] [TO-LOC HUẾ])`.
    Pred {
        clause: String,
        verb: String,
        args: Vec<LogicalTerm>,
    },
    /// Yes/no marker: `(m1 QUESTION YES-NO)`.
    Polar { clause: String },
}

impl fmt::Display for LogicalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalItem::Which { clause, noun } => write!(f, "({clause} WHICH {noun})"),
            LogicalItem::Pred { clause, verb, args } => {
                write!(f, "({clause} PRED {verb}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
            LogicalItem::Polar { clause } => write!(f, "({clause} QUESTION {YES_NO})"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalForm {
    pub items: Vec<LogicalItem>,
}

impl LogicalForm {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The `PRED` item: verb plus argument terms.
    pub fn predicate(&self) -> Option<(&str, &[LogicalTerm])> {
        self.items.iter().find_map(|item| match item {
            LogicalItem::Pred { verb, args, .. } => Some((verb.as_str(), args.as_slice())),
            _ => None,
        })
    }

    /// First argument term with `role`.
    pub fn term(&self, role: TermRole) -> Option<&str> {
        self.predicate()?
            .1
            .iter()
            .find(|t| t.role == role)
            .map(|t| t.value.as_str())
    }

    pub fn terms(&self, role: TermRole) -> impl Iterator<Item = &str> + '_ {
        self.predicate()
            .map(|(_, args)| args)
            .unwrap_or_default()
            .iter()
            .filter(move |t| t.role == role)
            .map(|t| t.value.as_str())
    }

    pub fn is_polar(&self) -> bool {
        self.items.iter().any(|item| matches!(item, LogicalItem::Polar { .. }))
    }
}

impl fmt::Display for LogicalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

/// Build the logical form: `WHICH` items in order, then the single `PRED`
/// carrying every argument term, then the yes/no marker.
///
/// Without a `PRED` relation the form is empty.
pub fn grammatical_to_logical(relations: &[GrammaticalRelation]) -> LogicalForm {
    let mut quantifiers = Vec::new();
    let mut verb: Option<&str> = None;
    let mut args = Vec::new();
    let mut polar = false;

    for relation in relations {
        match relation.kind {
            RelationKind::Which => quantifiers.push(LogicalItem::Which {
                clause: CLAUSE.to_string(),
                noun: relation.value.clone(),
            }),
            RelationKind::Pred => match verb {
                None => verb = Some(relation.value.as_str()),
                Some(first) => {
                    tracing::warn!(first, ignored = %relation.value, "more than one predicate; keeping the first");
                }
            },
            RelationKind::Question => polar = relation.value == YES_NO,
            kind => {
                if let Some(role) = TermRole::from_kind(kind) {
                    args.push(LogicalTerm {
                        role,
                        value: relation.value.clone(),
                    });
                }
            }
        }
    }

    let Some(verb) = verb else {
        return LogicalForm::default();
    };
    let mut items = quantifiers;
    items.push(LogicalItem::Pred {
        clause: CLAUSE.to_string(),
        verb: verb.to_string(),
        args,
    });
    if polar {
        items.push(LogicalItem::Polar {
            clause: CLAUSE.to_string(),
        });
    }
    LogicalForm { items }
}
