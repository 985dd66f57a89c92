//! Procedural query evaluation.
//!
//! `PRINT-ALL` starts from every known plane and intersects in the planes
//! matched by each condition (bound arguments constrain, `?`/`?var` do not).
//! The answer is then projected through the first condition that mentions
//! the output variable:
//! - plane column → the surviving planes,
//! - another column with a variable plane → `PLANE: VALUE` pairs,
//! - another column with a bound plane → the bare values.
//!
//! When no condition names the output variable, a bound `(MÁY_BAY id)` does:
//! the answer is the surviving planes.
//!
//! `TEST` checks a single `DTIME` condition and answers with a sentence.
//! Results are always sorted; "nothing matched" is [`Answer::NoResults`].

use std::collections::BTreeSet;
use std::fmt;

use flightq_nlp::procedural::INVALID_QUERY;
use flightq_nlp::{Arg, Command, Condition, Predicate, ProceduralQuery, Procedure};
use serde::Serialize;

use crate::{canonical_city, FactStore};

pub const NO_RESULTS: &str = "No results found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    Planes(Vec<String>),
    Values(Vec<String>),
    Pairs(Vec<(String, String)>),
    Verdict(String),
    NoResults,
    Invalid,
}

impl Answer {
    /// One line per element; sentinels and verdicts are a single line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Answer::Planes(v) | Answer::Values(v) => v.clone(),
            Answer::Pairs(pairs) => pairs.iter().map(|(p, v)| format!("{p}: {v}")).collect(),
            Answer::Verdict(s) => vec![s.clone()],
            Answer::NoResults => vec![NO_RESULTS.to_string()],
            Answer::Invalid => vec![INVALID_QUERY.to_string()],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Answer::NoResults | Answer::Invalid)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join(", "))
    }
}

/// One fact row viewed as columns, plane first.
type Row<'a> = Vec<&'a str>;

fn matches(arg: &Arg, value: &str) -> bool {
    match arg {
        Arg::Bound(bound) => bound == value,
        Arg::Var(_) | Arg::Wildcard => true,
    }
}

/// Bound city columns go through the same canonicalization as fact files.
fn normalized_args(condition: &Condition) -> Vec<Arg> {
    let city_columns = match condition.predicate {
        Predicate::Plane => 0..0,
        Predicate::ArrivalTime | Predicate::DepartureTime => 1..2,
        Predicate::RouteTime => 1..3,
    };
    condition
        .args
        .iter()
        .enumerate()
        .map(|(i, arg)| match arg {
            Arg::Bound(v) if city_columns.contains(&i) => Arg::Bound(canonical_city(v)),
            other => other.clone(),
        })
        .collect()
}

impl FactStore {
    fn rows(&self, predicate: Predicate) -> Vec<Row<'_>> {
        match predicate {
            Predicate::Plane => self.planes().iter().map(|p| vec![p.as_str()]).collect(),
            Predicate::ArrivalTime => self
                .arrivals()
                .iter()
                .map(|f| vec![f.plane.as_str(), f.city.as_str(), f.time.as_str()])
                .collect(),
            Predicate::DepartureTime => self
                .departures()
                .iter()
                .map(|f| vec![f.plane.as_str(), f.city.as_str(), f.time.as_str()])
                .collect(),
            Predicate::RouteTime => self
                .routes()
                .iter()
                .map(|f| vec![f.plane.as_str(), f.source.as_str(), f.dest.as_str(), f.duration.as_str()])
                .collect(),
        }
    }

    /// Rows of `predicate` agreeing with every bound argument.
    fn matching_rows(&self, predicate: Predicate, args: &[Arg]) -> Vec<Row<'_>> {
        self.rows(predicate)
            .into_iter()
            .filter(|row| args.iter().zip(row).all(|(arg, value)| matches(arg, value)))
            .collect()
    }

    /// Evaluate a procedural form. Never fails: malformed input is
    /// [`Answer::Invalid`], an empty match is [`Answer::NoResults`].
    pub fn query(&self, procedure: &Procedure) -> Answer {
        let Procedure::Query(query) = procedure else {
            return Answer::Invalid;
        };
        let answer = match query.command {
            Command::Test => self.test(query),
            Command::PrintAll => self.print_all(query),
        };
        tracing::debug!(%answer, "evaluated");
        answer
    }

    fn test(&self, query: &ProceduralQuery) -> Answer {
        let [condition] = query.conditions.as_slice() else {
            return Answer::Invalid;
        };
        if condition.predicate != Predicate::DepartureTime || !(2..=3).contains(&condition.args.len()) {
            return Answer::Invalid;
        }
        let args = normalized_args(condition);
        let (Some(plane), Some(city)) = (args[0].as_bound(), args[1].as_bound()) else {
            return Answer::Invalid;
        };
        let time = args.get(2).cloned().unwrap_or(Arg::Wildcard);
        let departs = self
            .departures()
            .iter()
            .any(|f| f.plane == plane && f.city == city && matches(&time, &f.time));
        if departs {
            Answer::Verdict(format!("Yes, {plane} departs from {city}"))
        } else {
            Answer::Verdict(format!("No, {plane} does not depart from {city}"))
        }
    }

    fn print_all(&self, query: &ProceduralQuery) -> Answer {
        let mut planes: BTreeSet<&str> = self.known_planes();
        let mut normalized = Vec::with_capacity(query.conditions.len());

        for condition in &query.conditions {
            if condition.args.len() != condition.predicate.arity() {
                tracing::debug!(%condition, "condition arity mismatch");
                return Answer::Invalid;
            }
            let args = normalized_args(condition);
            match condition.predicate {
                Predicate::Plane => {
                    if let Some(id) = args[0].as_bound() {
                        planes.retain(|p| *p == id);
                    }
                }
                predicate => {
                    let matched: BTreeSet<&str> = self
                        .matching_rows(predicate, &args)
                        .into_iter()
                        .map(|row| row[0])
                        .collect();
                    planes.retain(|p| matched.contains(p));
                }
            }
            tracing::trace!(%condition, remaining = planes.len(), "filtered");
            normalized.push((condition.predicate, args));
        }

        let projection = normalized
            .iter()
            .find_map(|(predicate, args)| {
                args.iter()
                    .position(|a| a.is_var(&query.output))
                    .map(|column| (*predicate, args, column))
            })
            .or_else(|| {
                // `(MÁY_BAY VJ5)` binds the plane the output variable would name.
                normalized
                    .iter()
                    .find(|(predicate, args)| *predicate == Predicate::Plane && args[0].as_bound().is_some())
                    .map(|(predicate, args)| (*predicate, args, 0))
            });
        let Some((predicate, args, column)) = projection else {
            tracing::debug!(output = %query.output, "output variable appears in no condition");
            return Answer::Invalid;
        };

        if column == 0 {
            return non_empty(planes.into_iter().map(str::to_string).collect(), Answer::Planes);
        }

        let rows = self
            .matching_rows(predicate, args)
            .into_iter()
            .filter(|row| planes.contains(row[0]));
        if args[0].as_bound().is_some() {
            let values: BTreeSet<String> = rows.map(|row| row[column].to_string()).collect();
            non_empty(values.into_iter().collect(), Answer::Values)
        } else {
            let pairs: BTreeSet<(String, String)> = rows
                .map(|row| (row[0].to_string(), row[column].to_string()))
                .collect();
            non_empty(pairs.into_iter().collect(), Answer::Pairs)
        }
    }
}

fn non_empty<T>(items: Vec<T>, wrap: impl FnOnce(Vec<T>) -> Answer) -> Answer {
    if items.is_empty() {
        Answer::NoResults
    } else {
        wrap(items)
    }
}
