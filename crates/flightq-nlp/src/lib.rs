//! Vietnamese flight questions → procedural queries.
//!
//! Stages (each a pure function of its input plus the static bank):
//! - [`tokenizer`]: normalization, segmentation, city/time re-merge,
//! - [`parser`]: shift-reduce replay of the reference relation [`bank`],
//! - [`grammatical`] → [`logical`] → [`procedural`]: the translator chain.
//!
//! [`pipeline::QueryProcessor`] wires them together. Evaluation against facts
//! lives in `flightq-factdb`.

pub mod arc;
pub mod bank;
pub mod grammatical;
pub mod lexicon;
pub mod logical;
pub mod parser;
pub mod pipeline;
pub mod procedural;
pub mod sexpr;
pub mod tokenizer;

pub use arc::{DependencyArc, RelationLabel};
pub use bank::RelationBank;
pub use pipeline::{Analysis, PipelineConfig, QueryProcessor};
pub use procedural::{Arg, Command, Condition, Predicate, ProceduralQuery, Procedure};
pub use tokenizer::Tokenizer;
