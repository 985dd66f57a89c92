//! Logical form → procedural query, plus its textual form.
//!
//! A procedural query is `(COMMAND ?out (COND ...)(COND ...))`. Exactly one
//! database predicate family is picked from the location terms present:
//! - TO-LOC only → `ATIME plane city time`
//! - FROM-LOC only → `DTIME plane city time`
//! - both → `RUN-TIME plane source dest time`
//!
//! A bound plane id with FROM-LOC alone in a yes/no question becomes a `TEST`.
//! Anything the table does not cover is [`Procedure::Invalid`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grammatical::CLAUSE;
use crate::lexicon::{city_code, is_plane_id};
use crate::logical::{LogicalForm, TermRole};
use crate::sexpr::{parse_form, SList, SexprError};

/// Sentinel rendering of an untranslatable query.
pub const INVALID_QUERY: &str = "Invalid query";

/// Free variable bound by a wh-time question.
pub const TIME_VAR: &str = "time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    #[serde(rename = "PRINT-ALL")]
    PrintAll,
    #[serde(rename = "TEST")]
    Test,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::PrintAll => "PRINT-ALL",
            Command::Test => "TEST",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Predicate {
    #[serde(rename = "MÁY_BAY")]
    Plane,
    #[serde(rename = "ATIME")]
    ArrivalTime,
    #[serde(rename = "DTIME")]
    DepartureTime,
    #[serde(rename = "RUN-TIME")]
    RouteTime,
}

impl Predicate {
    pub const ALL: [Predicate; 4] = [
        Predicate::Plane,
        Predicate::ArrivalTime,
        Predicate::DepartureTime,
        Predicate::RouteTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Predicate::Plane => "MÁY_BAY",
            Predicate::ArrivalTime => "ATIME",
            Predicate::DepartureTime => "DTIME",
            Predicate::RouteTime => "RUN-TIME",
        }
    }

    /// Number of columns in the matching fact relation.
    pub fn arity(self) -> usize {
        match self {
            Predicate::Plane => 1,
            Predicate::ArrivalTime | Predicate::DepartureTime => 3,
            Predicate::RouteTime => 4,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Predicate {
    type Err = ProcedureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Predicate::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ProcedureParseError::UnknownPredicate(s.to_string()))
    }
}

/// Condition argument: `?` wildcard, `?name` variable, or a bound literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Arg {
    Bound(String),
    Var(String),
    Wildcard,
}

impl Arg {
    pub fn var(name: &str) -> Self {
        Arg::Var(name.to_string())
    }

    pub fn bound(value: impl Into<String>) -> Self {
        Arg::Bound(value.into())
    }

    /// Read one atom of a procedural form.
    pub fn parse(atom: &str) -> Self {
        match atom.strip_prefix('?') {
            Some("") => Arg::Wildcard,
            Some(name) => Arg::Var(name.to_string()),
            None => Arg::Bound(atom.to_string()),
        }
    }

    pub fn as_bound(&self) -> Option<&str> {
        match self {
            Arg::Bound(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_var(&self, name: &str) -> bool {
        matches!(self, Arg::Var(v) if v == name)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Bound(v) => f.write_str(v),
            Arg::Var(name) => write!(f, "?{name}"),
            Arg::Wildcard => f.write_str("?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub predicate: Predicate,
    pub args: Vec<Arg>,
}

impl Condition {
    pub fn new(predicate: Predicate, args: Vec<Arg>) -> Self {
        Self { predicate, args }
    }

    fn from_list(list: &SList<'_>) -> Result<Self, ProcedureParseError> {
        Ok(Self {
            predicate: list.head.parse()?,
            args: list.args.iter().map(|a| Arg::parse(a)).collect(),
        })
    }

    pub fn mentions_var(&self, name: &str) -> bool {
        self.args.iter().any(|a| a.is_var(name))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.predicate)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProceduralQuery {
    pub command: Command,
    /// Name of the output variable, without the leading `?`.
    pub output: String,
    pub conditions: Vec<Condition>,
}

impl ProceduralQuery {
    /// `[command, ?out, condition...]` as separate strings.
    pub fn parts(&self) -> Vec<String> {
        let mut parts = vec![self.command.to_string(), format!("?{}", self.output)];
        parts.extend(self.conditions.iter().map(ToString::to_string));
        parts
    }
}

impl fmt::Display for ProceduralQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} ?{} ", self.command, self.output)?;
        for condition in &self.conditions {
            write!(f, "{condition}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Procedure {
    Query(ProceduralQuery),
    Invalid,
}

impl Procedure {
    pub fn query(&self) -> Option<&ProceduralQuery> {
        match self {
            Procedure::Query(q) => Some(q),
            Procedure::Invalid => None,
        }
    }

    pub fn parts(&self) -> Vec<String> {
        match self {
            Procedure::Query(q) => q.parts(),
            Procedure::Invalid => vec![INVALID_QUERY.to_string()],
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Query(q) => fmt::Display::fmt(q, f),
            Procedure::Invalid => f.write_str(INVALID_QUERY),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcedureParseError {
    #[error(transparent)]
    Sexpr(#[from] SexprError),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown predicate `{0}`")]
    UnknownPredicate(String),
    #[error("output must be a `?name` variable, found `{0}`")]
    Output(String),
}

impl FromStr for Procedure {
    type Err = ProcedureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == INVALID_QUERY {
            return Ok(Procedure::Invalid);
        }
        let form = parse_form(s)?;
        let command = match form.command {
            "PRINT-ALL" => Command::PrintAll,
            "TEST" => Command::Test,
            other => return Err(ProcedureParseError::UnknownCommand(other.to_string())),
        };
        let output = match Arg::parse(form.output) {
            Arg::Var(name) => name,
            _ => return Err(ProcedureParseError::Output(form.output.to_string())),
        };
        let conditions = form
            .lists
            .iter()
            .map(Condition::from_list)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Procedure::Query(ProceduralQuery {
            command,
            output,
            conditions,
        }))
    }
}

// ============================================================================
// Translation
// ============================================================================

fn city_arg(value: &str) -> Option<Arg> {
    let code = city_code(value);
    if code.is_none() {
        tracing::debug!(city = value, "no short code for city");
    }
    code.map(Arg::bound)
}

/// Select the predicate family and build the query.
pub fn logical_to_procedural(form: &LogicalForm) -> Procedure {
    if form.predicate().is_none() {
        return Procedure::Invalid;
    }

    let plane = form
        .terms(TermRole::Nmod)
        .find(|v| is_plane_id(v))
        .map(Arg::bound)
        .unwrap_or_else(|| Arg::var(CLAUSE));

    let (time, output) = if form.term(TermRole::WhTime).is_some() {
        (Arg::var(TIME_VAR), TIME_VAR)
    } else if let Some(t) = form.term(TermRole::AtTime) {
        (Arg::bound(t), CLAUSE)
    } else {
        (Arg::Wildcard, CLAUSE)
    };

    let to = form.term(TermRole::ToLoc).map(city_arg);
    let from = form.term(TermRole::FromLoc).map(city_arg);

    let family = match (from, to) {
        (Some(Some(from)), None) => Condition::new(Predicate::DepartureTime, vec![plane.clone(), from, time]),
        (None, Some(Some(to))) => Condition::new(Predicate::ArrivalTime, vec![plane.clone(), to, time]),
        (Some(Some(from)), Some(Some(to))) => {
            Condition::new(Predicate::RouteTime, vec![plane.clone(), from, to, time])
        }
        _ => return Procedure::Invalid,
    };

    let is_test = family.predicate == Predicate::DepartureTime
        && form.is_polar()
        && matches!(plane, Arg::Bound(_));
    if is_test {
        return Procedure::Query(ProceduralQuery {
            command: Command::Test,
            output: CLAUSE.to_string(),
            conditions: vec![family],
        });
    }

    Procedure::Query(ProceduralQuery {
        command: Command::PrintAll,
        output: output.to_string(),
        conditions: vec![Condition::new(Predicate::Plane, vec![plane]), family],
    })
}
