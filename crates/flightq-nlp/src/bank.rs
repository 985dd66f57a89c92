//! Reference relation bank: the finite table of arcs the parser may produce.
//!
//! The bank is the union of the arcs of every reference sentence pattern. It
//! is an oracle, not a grammar: the parser only ever emits an arc whose
//! `(head, dependent, label)` appears here verbatim (compared in lowercase).
//!
//! Lookups go through an index built once when the bank is created:
//! - `(head, dependent) -> entry` for LEFT-ARC / RIGHT-ARC candidates,
//! - `head -> entries` for REDUCE's "still expects a dependent" check,
//! - `dependent -> labels` for coverage diagnostics.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Serialize;
use thiserror::Error;

use crate::arc::{DependencyArc, RelationLabel};

use RelationLabel::*;

/// Reference sentences the built-in bank is made from:
///
/// ```text
/// Máy bay nào đến thành phố Huế lúc 13:30HR ?
/// Máy bay VN4 có xuất phát từ Đà Nẵng không ?
/// Những máy bay nào xuất phát từ TP. Hồ Chí Minh ?
/// Máy bay nào bay từ Hà Nội đến Khánh Hòa ?
/// Thời gian máy bay VN1 bay từ Hà Nội đến Huế mất bao lâu ?
/// Máy bay VJ5 đến Đà Nẵng lúc mấy giờ ?
/// Máy bay nào hạ cánh ở Hải Phòng lúc 10 giờ ?
/// Máy bay VJ2 có xuất phát từ Huế lúc 8:30HR không ?
/// Máy bay nào xuất phát từ Hải Phòng lúc 7:00HR ?
/// Máy bay nào bay từ Đà Nẵng đến TP. Hồ Chí Minh mất bao lâu ?
/// ```
const REFERENCE_ENTRIES: &[(&str, &str, RelationLabel)] = &[
    // noun phrase of the subject
    ("máy bay", "nào", Which),
    ("máy bay", "những", Det),
    ("máy bay", "các", Det),
    ("máy bay", "thời gian", Discourse),
    ("máy bay", "vn1", Nmod),
    ("máy bay", "vn4", Nmod),
    ("máy bay", "vj2", Nmod),
    ("máy bay", "vj5", Nmod),
    // subjects
    ("đến", "máy bay", Nsubj),
    ("bay", "máy bay", Nsubj),
    ("xuất phát", "máy bay", Nsubj),
    ("hạ cánh", "máy bay", Nsubj),
    ("xuất phát", "có", Aux),
    // locations
    ("đến", "thành phố", ToLoc),
    ("đến", "đà nẵng", ToLoc),
    ("bay", "đến", ToLoc),
    ("hạ cánh", "ở", ToLoc),
    ("xuất phát", "từ", FromLoc),
    ("bay", "từ", FromLoc),
    ("thành phố", "huế", Nmod),
    ("từ", "đà nẵng", Nmod),
    ("từ", "tp. hồ chí minh", Nmod),
    ("từ", "hà nội", Nmod),
    ("từ", "huế", Nmod),
    ("từ", "hải phòng", Nmod),
    ("đến", "khánh hòa", Nmod),
    ("đến", "huế", Nmod),
    ("đến", "tp. hồ chí minh", Nmod),
    ("ở", "hải phòng", Nmod),
    // times
    ("đến", "lúc", At),
    ("hạ cánh", "lúc", At),
    ("xuất phát", "lúc", At),
    ("bay", "mất", At),
    ("lúc", "13:30hr", AtTime),
    ("lúc", "10:00hr", AtTime),
    ("lúc", "8:30hr", AtTime),
    ("lúc", "7:00hr", AtTime),
    ("lúc", "mấy giờ", WhTime),
    ("mất", "bao lâu", WhTime),
    // clause end
    ("xuất phát", "không", Question),
    ("xuất phát", "?", Punctuation),
    ("bay", "?", Punctuation),
    ("hạ cánh", "?", Punctuation),
];

/// Lookup key: bank matching ignores letter case only.
pub fn lexical_key(token: &str) -> String {
    token.to_lowercase()
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("bank line {line}: {message}")]
    Line { line: usize, message: String },
    #[error("failed to read bank file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub usize);

#[derive(Debug, Clone, Default)]
pub struct RelationBank {
    entries: Vec<DependencyArc>,
    by_pair: HashMap<(String, String), EntryId>,
    by_head: HashMap<String, Vec<EntryId>>,
    by_dependent: HashMap<String, Vec<RelationLabel>>,
}

impl RelationBank {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = DependencyArc>,
    {
        let mut bank = RelationBank::default();
        for entry in entries {
            bank.insert(entry);
        }
        bank
    }

    fn insert(&mut self, entry: DependencyArc) {
        let head = lexical_key(&entry.head);
        let dependent = lexical_key(&entry.dependent);
        let normalized = DependencyArc::new(head.clone(), dependent.clone(), entry.label);
        if self.entries.contains(&normalized) {
            return;
        }
        let id = EntryId(self.entries.len());
        self.by_pair.entry((head.clone(), dependent.clone())).or_insert(id);
        self.by_head.entry(head).or_default().push(id);
        let labels = self.by_dependent.entry(dependent).or_default();
        if !labels.contains(&entry.label) {
            labels.push(entry.label);
        }
        self.entries.push(normalized);
    }

    /// The built-in bank, indexed on first use and shared for the process.
    pub fn reference() -> &'static RelationBank {
        static BANK: OnceLock<RelationBank> = OnceLock::new();
        BANK.get_or_init(|| {
            RelationBank::from_entries(
                REFERENCE_ENTRIES
                    .iter()
                    .map(|&(head, dependent, label)| DependencyArc::new(head, dependent, label)),
            )
        })
    }

    /// Parse a bank from `label(head, dependent)` lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(text: &str) -> Result<Self, BankError> {
        let mut entries = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let arc: DependencyArc = line.parse().map_err(|e| BankError::Line {
                line: idx + 1,
                message: format!("{e}"),
            })?;
            entries.push(arc);
        }
        Ok(Self::from_entries(entries))
    }

    pub fn load(path: &Path) -> Result<Self, BankError> {
        let text = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let bank = Self::parse(&text)?;
        tracing::info!(path = %path.display(), entries = bank.len(), "loaded relation bank");
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DependencyArc] {
        &self.entries
    }

    pub fn entry(&self, id: EntryId) -> &DependencyArc {
        &self.entries[id.0]
    }

    /// The permitted arc `head → dependent`, if any.
    pub fn lookup(&self, head: &str, dependent: &str) -> Option<(EntryId, RelationLabel)> {
        self.by_pair
            .get(&(lexical_key(head), lexical_key(dependent)))
            .map(|&id| (id, self.entries[id.0].label))
    }

    /// All entries headed by `head`.
    pub fn headed_by(&self, head: &str) -> impl Iterator<Item = (EntryId, &DependencyArc)> + '_ {
        self.by_head
            .get(&lexical_key(head))
            .into_iter()
            .flatten()
            .map(|&id| (id, &self.entries[id.0]))
    }

    /// Labels under which `token` may appear as a dependent.
    pub fn labels_as_dependent(&self, token: &str) -> &[RelationLabel] {
        self.by_dependent
            .get(&lexical_key(token))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `token` occurs anywhere in the bank.
    pub fn covers(&self, token: &str) -> bool {
        let key = lexical_key(token);
        self.by_dependent.contains_key(&key) || self.by_head.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_bank_is_indexed_case_insensitively() {
        let bank = RelationBank::reference();
        assert_eq!(bank.len(), REFERENCE_ENTRIES.len());
        assert_eq!(bank.lookup("Máy bay", "nào").map(|(_, l)| l), Some(Which));
        assert_eq!(bank.lookup("lúc", "13:30HR").map(|(_, l)| l), Some(AtTime));
        assert_eq!(bank.lookup("nào", "Máy bay"), None);
        assert!(bank.labels_as_dependent("máy bay").contains(&Nsubj));
        assert!(bank.covers("Huế"));
        assert!(!bank.covers("Vinh"));
    }

    #[test]
    fn parse_skips_comments_and_reports_bad_lines() {
        let bank = RelationBank::parse("# demo\nwhich(máy bay, nào)\n\nnsubj(bay, máy bay)\n")
            .expect("parse bank");
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.headed_by("máy bay").count(), 1);

        let err = RelationBank::parse("which(máy bay, nào)\nsubject(bay, máy bay)").unwrap_err();
        assert!(matches!(err, BankError::Line { line: 2, .. }));
    }

    #[test]
    fn duplicate_entries_collapse() {
        let bank = RelationBank::parse("which(máy bay, nào)\nwhich(Máy bay, nào)").expect("parse");
        assert_eq!(bank.len(), 1);
    }
}
