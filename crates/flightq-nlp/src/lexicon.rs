//! Fixed vocabulary shared by every pipeline stage.
//!
//! One canonical table of cities is consulted by:
//! - the tokenizer (spelling variants → canonical multi-word name),
//! - the translator (canonical name → short code used in conditions),
//! - the fact store (names or codes in fact files → short code).
//!
//! Keeping the table in one place means a new city is added once.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The generic noun for "city"; location arcs that end on it wait for an
/// `nmod` arc carrying the concrete name.
pub const GENERIC_CITY_NOUN: &str = "thành phố";

/// Surface forms the parser treats as the clause's main verb.
pub const MAIN_VERBS: &[&str] = &["đến", "bay", "xuất phát", "hạ cánh"];

/// Particle that turns a statement into a yes/no question.
pub const POLAR_PARTICLE: &str = "không";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    /// Canonical multi-word spelling, as it appears in normalized text.
    pub name: &'static str,
    /// Short code used in facts and procedural conditions.
    pub code: &'static str,
    /// Case-insensitive spelling variants rewritten to `name` before
    /// segmentation. Every pattern also matches `name` itself so the rewrite
    /// is idempotent.
    variants: &'static [&'static str],
}

impl City {
    /// Uppercased canonical name, the form carried by grammatical relations.
    pub fn upper_name(&self) -> String {
        self.name.to_uppercase()
    }
}

pub const CITIES: &[City] = &[
    City {
        name: "Huế",
        code: "HUE",
        variants: &[r"(?i)\bhuế\b"],
    },
    City {
        name: "TP. Hồ Chí Minh",
        code: "HCM",
        variants: &[
            r"(?i)(?:\btp\s*\.?\s*|\bthành\s+phố\s+)?(?:\bhồ\s*chí\s*minh\b|hcm\b)",
            r"(?i)\bsài\s*gòn\b",
        ],
    },
    City {
        name: "Đà Nẵng",
        code: "ĐN",
        variants: &[r"(?i)\bđà\s*nẵng\b", r"(?i)\bda\s*nang\b"],
    },
    City {
        name: "Hà Nội",
        code: "HN",
        variants: &[r"(?i)\bhà\s*nội\b", r"(?i)\bha\s*noi\b"],
    },
    City {
        name: "Khánh Hòa",
        code: "KH",
        variants: &[r"(?i)\bkhánh\s*h(?:òa|oà)\b", r"(?i)\bkhanh\s*hoa\b"],
    },
    City {
        name: "Hải Phòng",
        code: "HP",
        variants: &[r"(?i)\bhải\s*phòng\b", r"(?i)\bhai\s*phong\b"],
    },
];

/// Compiled variant patterns, paired with the canonical name they produce.
pub(crate) fn city_variant_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CITIES
            .iter()
            .flat_map(|city| {
                city.variants.iter().map(move |pattern| {
                    let re = Regex::new(pattern).expect("city variant pattern compiles");
                    (re, city.name)
                })
            })
            .collect()
    })
}

/// Look up a city by its canonical name, in any letter case.
pub fn city_by_name(name: &str) -> Option<&'static City> {
    let folded = name.trim().to_lowercase();
    CITIES.iter().find(|c| c.name.to_lowercase() == folded)
}

pub fn city_by_code(code: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.code == code)
}

/// Resolve a fact-file or user-supplied city reference to its short code.
///
/// Accepts a code, the canonical name, or any spelling variant.
pub fn city_code(reference: &str) -> Option<&'static str> {
    if let Some(city) = city_by_code(reference) {
        return Some(city.code);
    }
    if let Some(city) = city_by_name(reference) {
        return Some(city.code);
    }
    city_variant_patterns()
        .iter()
        .find(|(re, _)| {
            re.find(reference)
                .is_some_and(|m| m.start() == 0 && m.end() == reference.len())
        })
        .and_then(|(_, name)| city_by_name(name))
        .map(|c| c.code)
}

pub fn is_main_verb(token: &str) -> bool {
    let folded = token.to_lowercase();
    MAIN_VERBS.iter().any(|v| *v == folded)
}

/// Plane ids look like `VN4`, `VJ12`: two uppercase letters then digits.
pub fn is_plane_id(value: &str) -> bool {
    let mut chars = value.chars();
    let prefix_ok = chars.by_ref().take(2).filter(|c| c.is_ascii_uppercase()).count() == 2;
    let rest: Vec<char> = chars.collect();
    prefix_ok && !rest.is_empty() && rest.iter().all(|c| c.is_ascii_digit())
}

// ============================================================================
// Stop words
// ============================================================================

/// Optional stop-word list (one word per line, compared case-insensitively).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn parse(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// Read a stop-word file. A missing or unreadable file degrades to an
    /// empty list with a warning.
    pub fn load_or_empty(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let words = Self::parse(&text);
                tracing::info!(path = %path.display(), count = words.len(), "loaded stop words");
                words
            }
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "stop-word file unavailable; continuing without stop words"
                );
                Self::default()
            }
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
