//! Flight fact store and procedural query evaluator.
//!
//! Four relations, loaded once from a line-oriented fact file and never
//! mutated afterwards:
//! - `(MÁY_BAY id)`
//! - `(ATIME plane city time)`
//! - `(DTIME plane city time)`
//! - `(RUN-TIME plane source dest duration)`
//!
//! Every relation is a `BTreeSet`, so any iteration (and therefore any answer)
//! comes out in the same order on every run.

use std::collections::BTreeSet;
use std::path::Path;

use flightq_nlp::lexicon::city_code;
use flightq_nlp::sexpr::parse_list;
use flightq_nlp::Predicate;
use serde::Serialize;
use thiserror::Error;

pub mod eval;

pub use eval::{Answer, NO_RESULTS};

#[derive(Debug, Error)]
pub enum FactDbError {
    #[error("fact file not found: {path}")]
    NotFound { path: String },
    #[error("failed to read fact file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// `ATIME`/`DTIME` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeFact {
    pub plane: String,
    pub city: String,
    pub time: String,
}

/// `RUN-TIME` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteFact {
    pub plane: String,
    pub source: String,
    pub dest: String,
    pub duration: String,
}

/// Short code for a known city (by code, name or spelling variant); anything
/// else is kept as written.
pub fn canonical_city(raw: &str) -> String {
    city_code(raw).map(str::to_string).unwrap_or_else(|| raw.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FactStore {
    planes: BTreeSet<String>,
    arrivals: BTreeSet<TimeFact>,
    departures: BTreeSet<TimeFact>,
    routes: BTreeSet<RouteFact>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, FactDbError> {
        let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => FactDbError::NotFound {
                path: path.display().to_string(),
            },
            _ => FactDbError::Io {
                path: path.display().to_string(),
                source,
            },
        })?;
        let store = Self::parse(&text);
        tracing::info!(
            path = %path.display(),
            planes = store.known_planes().len(),
            facts = store.len(),
            "loaded facts"
        );
        Ok(store)
    }

    /// One fact per line. Malformed lines are skipped, never fatal.
    pub fn parse(text: &str) -> Self {
        let mut store = Self::default();
        let mut skipped = 0usize;
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let inserted = parse_list(line)
                .ok()
                .and_then(|list| {
                    let predicate: Predicate = list.head.parse().ok()?;
                    Some(store.insert(predicate, &list.args))
                })
                .unwrap_or(false);
            if !inserted {
                skipped += 1;
                tracing::debug!(line = idx + 1, text = line, "skipping malformed fact");
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "fact lines skipped");
        }
        store
    }

    /// Add one fact. Returns `false` when `args` does not fit `predicate`.
    pub fn insert(&mut self, predicate: Predicate, args: &[&str]) -> bool {
        if args.len() != predicate.arity() {
            return false;
        }
        match predicate {
            Predicate::Plane => {
                self.planes.insert(args[0].to_string());
            }
            Predicate::ArrivalTime | Predicate::DepartureTime => {
                let fact = TimeFact {
                    plane: args[0].to_string(),
                    city: canonical_city(args[1]),
                    time: args[2].to_string(),
                };
                if predicate == Predicate::ArrivalTime {
                    self.arrivals.insert(fact);
                } else {
                    self.departures.insert(fact);
                }
            }
            Predicate::RouteTime => {
                self.routes.insert(RouteFact {
                    plane: args[0].to_string(),
                    source: canonical_city(args[1]),
                    dest: canonical_city(args[2]),
                    duration: args[3].to_string(),
                });
            }
        }
        true
    }

    pub fn planes(&self) -> &BTreeSet<String> {
        &self.planes
    }

    pub fn arrivals(&self) -> &BTreeSet<TimeFact> {
        &self.arrivals
    }

    pub fn departures(&self) -> &BTreeSet<TimeFact> {
        &self.departures
    }

    pub fn routes(&self) -> &BTreeSet<RouteFact> {
        &self.routes
    }

    /// Plane ids mentioned by any time relation. `MÁY_BAY` facts alone do not
    /// make a plane known.
    pub fn known_planes(&self) -> BTreeSet<&str> {
        self.arrivals
            .iter()
            .chain(&self.departures)
            .map(|f| f.plane.as_str())
            .chain(self.routes.iter().map(|f| f.plane.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.planes.len() + self.arrivals.len() + self.departures.len() + self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
