//! End-to-end translation of one question: text → procedural query.
//!
//! [`QueryProcessor`] owns the tokenizer and (optionally) a relation bank read
//! from disk; everything it holds is read-only after construction, so one
//! processor can serve any number of queries.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arc::DependencyArc;
use crate::bank::{BankError, RelationBank};
use crate::grammatical::{arcs_to_grammatical, GrammaticalRelation};
use crate::lexicon::StopWords;
use crate::logical::{grammatical_to_logical, LogicalForm};
use crate::parser::{DependencyParser, Transition};
use crate::procedural::{logical_to_procedural, Procedure};
use crate::tokenizer::{Token, Tokenizer};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop stop words after city/time merging.
    pub filter_stopwords: bool,
    /// One stop word per line. Missing or unreadable degrades to none.
    pub stopwords_path: Option<PathBuf>,
    /// Replace the built-in relation bank.
    pub bank_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config `{path}`: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Bank(#[from] BankError),
}

impl PipelineConfig {
    /// Read a JSON config; absent keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

// ============================================================================
// Processor
// ============================================================================

/// Every intermediate stage of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub query: String,
    pub tokens: Vec<Token>,
    pub dependencies: Vec<DependencyArc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
    pub grammatical: Vec<GrammaticalRelation>,
    pub logical: LogicalForm,
    pub procedural: Procedure,
}

pub struct QueryProcessor {
    tokenizer: Tokenizer,
    bank: Option<RelationBank>,
}

impl Default for QueryProcessor {
    fn default() -> Self {
        Self {
            tokenizer: Tokenizer::default(),
            bank: None,
        }
    }
}

impl QueryProcessor {
    pub fn new(tokenizer: Tokenizer, bank: Option<RelationBank>) -> Self {
        Self { tokenizer, bank }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let stopwords = match &config.stopwords_path {
            Some(path) => StopWords::load_or_empty(path),
            None => {
                if config.filter_stopwords {
                    tracing::warn!("stop-word filtering enabled without a stop-word list");
                }
                StopWords::default()
            }
        };
        let tokenizer = Tokenizer::default().with_stopwords(stopwords, config.filter_stopwords);
        let bank = config
            .bank_path
            .as_deref()
            .map(RelationBank::load)
            .transpose()?;
        Ok(Self::new(tokenizer, bank))
    }

    pub fn bank(&self) -> &RelationBank {
        self.bank.as_ref().unwrap_or_else(|| RelationBank::reference())
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Run every translation stage. Never fails: an unparseable question ends
    /// as [`Procedure::Invalid`].
    pub fn process(&self, query: &str) -> Analysis {
        let tokens = self.tokenizer.tokenize(query);
        tracing::debug!(?tokens, "tokenized");

        let parse = DependencyParser::new(self.bank()).parse(&tokens);
        tracing::debug!(arcs = parse.arcs.len(), transitions = parse.transitions.len(), "parsed");

        let grammatical = arcs_to_grammatical(&parse.arcs);
        let logical = grammatical_to_logical(&grammatical);
        tracing::debug!(logical = %logical, "logical form");

        let procedural = logical_to_procedural(&logical);
        tracing::debug!(procedural = %procedural, "procedural form");

        Analysis {
            query: query.to_string(),
            tokens,
            dependencies: parse.arcs,
            transitions: parse.transitions,
            grammatical,
            logical,
            procedural,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_keys() {
        let config: PipelineConfig = serde_json::from_str(r#"{"filter_stopwords": true}"#).expect("json");
        assert!(config.filter_stopwords);
        assert_eq!(config.bank_path, None);
    }

    #[test]
    fn processes_arrival_question() {
        let analysis = QueryProcessor::default().process("Máy bay nào đến thành phố Huế lúc 13:30HR ?");
        assert_eq!(analysis.tokens.len(), 8);
        assert_eq!(
            analysis.procedural.to_string(),
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE 13:30HR))"
        );
    }

    #[test]
    fn unparseable_question_is_invalid() {
        let analysis = QueryProcessor::default().process("Hôm nay trời đẹp không ?");
        assert!(analysis.dependencies.is_empty());
        assert!(analysis.grammatical.is_empty());
        assert!(analysis.logical.is_empty());
        assert_eq!(analysis.procedural, Procedure::Invalid);
    }
}
