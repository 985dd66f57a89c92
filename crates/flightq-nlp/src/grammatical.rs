//! Arcs → grammatical relations.
//!
//! A dispatch on the arc label, one relation (or none) per arc, with one piece
//! of lookahead: a `to-loc`/`from-loc` arc whose dependent is not itself a city
//! (the generic noun `thành phố`, or a preposition like `từ`) is held pending
//! until a later `nmod` headed by that dependent supplies the city name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arc::{DependencyArc, RelationLabel};
use crate::bank::lexical_key;
use crate::lexicon::{city_by_name, POLAR_PARTICLE};

/// The single clause marker: one query is one clause.
pub const CLAUSE: &str = "m1";

/// Value carried by a `QUESTION` relation for a yes/no question.
pub const YES_NO: &str = "YES-NO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RelationKind {
    Pred,
    Lsubj,
    Which,
    ToLoc,
    FromLoc,
    Nmod,
    AtTime,
    WhTime,
    Question,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Pred => "PRED",
            RelationKind::Lsubj => "LSUBJ",
            RelationKind::Which => "WHICH",
            RelationKind::ToLoc => "TO-LOC",
            RelationKind::FromLoc => "FROM-LOC",
            RelationKind::Nmod => "NMOD",
            RelationKind::AtTime => "AT-TIME",
            RelationKind::WhTime => "WH-TIME",
            RelationKind::Question => "QUESTION",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammaticalRelation {
    pub kind: RelationKind,
    pub clause: String,
    pub value: String,
}

impl GrammaticalRelation {
    pub fn new(kind: RelationKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            clause: CLAUSE.to_string(),
            value: value.into(),
        }
    }
}

impl fmt::Display for GrammaticalRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.kind, self.clause, self.value)
    }
}

fn upper(token: &str) -> String {
    token.to_uppercase()
}

/// Translate arcs, in production order, to grammatical relations.
///
/// Total: unknown or purely structural labels (`at`, `det`, `aux`,
/// `discourse`, `punctuation`) produce nothing, and an empty arc list gives
/// an empty relation list.
pub fn arcs_to_grammatical(arcs: &[DependencyArc]) -> Vec<GrammaticalRelation> {
    let mut out = Vec::new();
    // (lexical key of the awaited nmod head, relation to emit)
    let mut pending: Vec<(String, RelationKind)> = Vec::new();

    for arc in arcs {
        match arc.label {
            RelationLabel::Root => out.push(GrammaticalRelation::new(RelationKind::Pred, upper(&arc.dependent))),
            RelationLabel::Nsubj => out.push(GrammaticalRelation::new(RelationKind::Lsubj, upper(&arc.dependent))),
            RelationLabel::Which => out.push(GrammaticalRelation::new(RelationKind::Which, upper(&arc.head))),
            RelationLabel::ToLoc | RelationLabel::FromLoc => {
                let kind = if arc.label == RelationLabel::ToLoc {
                    RelationKind::ToLoc
                } else {
                    RelationKind::FromLoc
                };
                if city_by_name(&arc.dependent).is_some() {
                    out.push(GrammaticalRelation::new(kind, upper(&arc.dependent)));
                } else {
                    pending.push((lexical_key(&arc.dependent), kind));
                }
            }
            RelationLabel::Nmod => {
                let key = lexical_key(&arc.head);
                match pending.iter().position(|(head, _)| *head == key) {
                    Some(idx) => {
                        let (_, kind) = pending.remove(idx);
                        out.push(GrammaticalRelation::new(kind, upper(&arc.dependent)));
                    }
                    None => out.push(GrammaticalRelation::new(RelationKind::Nmod, upper(&arc.dependent))),
                }
            }
            RelationLabel::AtTime => out.push(GrammaticalRelation::new(RelationKind::AtTime, upper(&arc.dependent))),
            RelationLabel::WhTime => out.push(GrammaticalRelation::new(RelationKind::WhTime, upper(&arc.dependent))),
            RelationLabel::Question if lexical_key(&arc.dependent) == POLAR_PARTICLE => {
                out.push(GrammaticalRelation::new(RelationKind::Question, YES_NO));
            }
            _ => {}
        }
    }

    for (head, kind) in pending {
        tracing::debug!(%head, %kind, "location never resolved to a city");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use RelationLabel::*;

    fn arc(label: RelationLabel, head: &str, dependent: &str) -> DependencyArc {
        DependencyArc::new(head, dependent, label)
    }

    fn rendered(relations: &[GrammaticalRelation]) -> Vec<String> {
        relations.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn generic_city_noun_waits_for_the_name() {
        let arcs = vec![
            arc(Which, "Máy bay", "nào"),
            arc(Nsubj, "đến", "Máy bay"),
            DependencyArc::root("đến"),
            arc(ToLoc, "đến", "thành phố"),
            arc(Nmod, "thành phố", "Huế"),
            arc(At, "đến", "lúc"),
            arc(AtTime, "lúc", "13:30HR"),
        ];
        assert_eq!(
            rendered(&arcs_to_grammatical(&arcs)),
            vec![
                "(WHICH m1 MÁY BAY)",
                "(LSUBJ m1 MÁY BAY)",
                "(PRED m1 ĐẾN)",
                "(TO-LOC m1 HUẾ)",
                "(AT-TIME m1 13:30HR)",
            ]
        );
    }

    #[test]
    fn prepositions_wait_and_cities_emit_directly() {
        let arcs = vec![
            arc(FromLoc, "bay", "từ"),
            arc(Nmod, "từ", "Hà Nội"),
            arc(ToLoc, "đến", "Đà Nẵng"),
        ];
        assert_eq!(
            rendered(&arcs_to_grammatical(&arcs)),
            vec!["(FROM-LOC m1 HÀ NỘI)", "(TO-LOC m1 ĐÀ NẴNG)"]
        );
    }

    #[test]
    fn plain_nmod_and_polar_question() {
        let arcs = vec![
            arc(Nmod, "Máy bay", "VN4"),
            arc(Aux, "xuất phát", "có"),
            arc(Question, "xuất phát", "không"),
            arc(Punctuation, "bay", "?"),
        ];
        assert_eq!(
            rendered(&arcs_to_grammatical(&arcs)),
            vec!["(NMOD m1 VN4)", "(QUESTION m1 YES-NO)"]
        );
    }

    #[test]
    fn unresolved_location_is_dropped() {
        let arcs = vec![arc(ToLoc, "hạ cánh", "ở")];
        assert!(arcs_to_grammatical(&arcs).is_empty());
        assert!(arcs_to_grammatical(&[]).is_empty());
    }
}
