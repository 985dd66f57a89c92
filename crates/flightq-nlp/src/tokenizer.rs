//! Normalizer + tokenizer for Vietnamese flight questions.
//!
//! Stages, in order (each a pure rewrite):
//! 1. city spelling variants → one canonical multi-word name,
//! 2. time expressions → `H:MMHR` literals,
//! 3. word segmentation (pluggable [`WordSegmenter`]), joiner `_` → space,
//! 4. re-merge of city names and time literals the segmenter split apart,
//! 5. optional stop-word removal, always after merging.
//!
//! No adjacent-duplicate collapsing happens anywhere: order and multiplicity
//! of tokens are preserved.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, NoExpand, Regex};

use crate::lexicon::{city_variant_patterns, StopWords, CITIES};

/// One semantic unit after merging. Multi-word tokens use plain spaces.
pub type Token = String;

/// Marker a segmenter uses to glue syllables of one word together.
pub const WORD_JOINER: char = '_';

/// External word segmenter.
///
/// Given normalized text, return base tokens; syllables of a multi-syllable
/// word are joined with [`WORD_JOINER`] (e.g. `máy_bay`). Any segmenter with
/// comparable output can be substituted.
pub trait WordSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

// ============================================================================
// Default segmenter
// ============================================================================

/// Multi-syllable words known to the default segmenter.
const DEFAULT_WORDS: &[&str] = &[
    "máy bay",
    "thành phố",
    "xuất phát",
    "khởi hành",
    "hạ cánh",
    "cất cánh",
    "mã hiệu",
    "thời gian",
    "bao lâu",
    "mấy giờ",
    "hãng hàng không",
    "hôm nay",
    "hồ chí minh",
    "đà nẵng",
    "hà nội",
    "khánh hòa",
    "hải phòng",
    "sài gòn",
];

const PUNCTUATION: &[char] = &['?', '!', ',', '.', ':', ';', '(', ')', '"'];

/// Greedy longest-match segmenter over a fixed word list.
///
/// Punctuation is split off into its own token first, which is also what
/// splits `13:30HR` into `13`, `:`, `30HR` (stage 4 puts it back together).
#[derive(Debug, Clone)]
pub struct LexiconSegmenter {
    words: HashSet<String>,
    longest: usize,
}

impl LexiconSegmenter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let longest = words
            .iter()
            .map(|w| w.split(' ').count())
            .max()
            .unwrap_or(1);
        Self { words, longest }
    }
}

impl Default for LexiconSegmenter {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS)
    }
}

impl WordSegmenter for LexiconSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let syllables = split_syllables(text);
        let joiner = WORD_JOINER.to_string();
        let mut out = Vec::with_capacity(syllables.len());
        let mut i = 0;
        'outer: while i < syllables.len() {
            let max = self.longest.min(syllables.len() - i);
            for n in (2..=max).rev() {
                let window = &syllables[i..i + n];
                let phrase = window.join(" ").to_lowercase();
                if self.words.contains(&phrase) {
                    out.push(window.join(joiner.as_str()));
                    i += n;
                    continue 'outer;
                }
            }
            out.push(syllables[i].clone());
            i += 1;
        }
        out
    }
}

fn split_syllables(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for chunk in text.split_whitespace() {
        let mut current = String::new();
        for c in chunk.chars() {
            if PUNCTUATION.contains(&c) {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
                out.push(c.to_string());
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

// ============================================================================
// Normalization (stages 1–2)
// ============================================================================

fn time_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i)\b(\d{1,2})\s*giờ\s*(\d{1,2})(?:\s*phút\b)?")
                .expect("hour-minute pattern compiles"),
            Regex::new(r"(?i)\b(\d{1,2})\s*giờ\b").expect("hour pattern compiles"),
            Regex::new(r"(?i)\b(\d{1,2})\s*:\s*(\d{2})\s*hr\b").expect("time literal pattern compiles"),
        ]
    })
}

/// Canonicalize city spellings (stage 1).
pub fn canonicalize_cities(text: &str) -> String {
    let mut out = text.to_string();
    for (re, name) in city_variant_patterns() {
        out = re.replace_all(&out, NoExpand(name)).into_owned();
    }
    out
}

/// Canonicalize time expressions to `H:MMHR` (stage 2).
pub fn canonicalize_times(text: &str) -> String {
    let [hour_minute, hour, literal] = time_patterns();
    let out = hour_minute.replace_all(text, |caps: &Captures| {
        let minutes: u32 = caps[2].parse().unwrap_or(0);
        format!("{}:{:02}HR", &caps[1], minutes)
    });
    let out = hour.replace_all(&out, "${1}:00HR");
    literal.replace_all(&out, "${1}:${2}HR").into_owned()
}

/// Stages 1 and 2. Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    canonicalize_times(&canonicalize_cities(text))
}

// ============================================================================
// Re-merge (stage 4)
// ============================================================================

fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn match_city_span(tokens: &[Token]) -> Option<(&'static str, usize)> {
    for city in CITIES {
        let target = compact(city.name);
        let mut acc = String::new();
        for (k, tok) in tokens.iter().enumerate() {
            acc.push_str(&compact(tok));
            if acc == target {
                return Some((city.name, k + 1));
            }
            if !target.starts_with(&acc) {
                break;
            }
        }
    }
    None
}

fn is_hour(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
}

fn is_minute(s: &str) -> bool {
    s.len() == 2 && s.chars().all(|c| c.is_ascii_digit())
}

fn match_time_span(tokens: &[Token]) -> Option<(Token, usize)> {
    match tokens {
        [h, colon, m, hr, ..] if is_hour(h) && colon == ":" && is_minute(m) && hr.eq_ignore_ascii_case("HR") => {
            Some((format!("{h}:{m}HR"), 4))
        }
        [h, colon, mhr, ..]
            if is_hour(h)
                && colon == ":"
                && mhr.len() == 4
                && mhr.is_char_boundary(2)
                && is_minute(&mhr[..2])
                && mhr[2..].eq_ignore_ascii_case("HR") =>
        {
            Some((format!("{h}:{}HR", &mhr[..2]), 3))
        }
        _ => None,
    }
}

/// Glue back city names and time literals that segmentation split apart.
pub fn merge_split_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if let Some((name, width)) = match_city_span(&tokens[i..]) {
            out.push(name.to_string());
            i += width;
        } else if let Some((time, width)) = match_time_span(&tokens[i..]) {
            out.push(time);
            i += width;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}

// ============================================================================
// Tokenizer
// ============================================================================

pub struct Tokenizer {
    segmenter: Box<dyn WordSegmenter>,
    stopwords: StopWords,
    filter_stopwords: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(LexiconSegmenter::default())
    }
}

impl Tokenizer {
    pub fn new(segmenter: impl WordSegmenter + 'static) -> Self {
        Self {
            segmenter: Box::new(segmenter),
            stopwords: StopWords::default(),
            filter_stopwords: false,
        }
    }

    pub fn with_stopwords(mut self, stopwords: StopWords, filter: bool) -> Self {
        self.stopwords = stopwords;
        self.filter_stopwords = filter;
        self
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let normalized = normalize(text);
        let base: Vec<Token> = self
            .segmenter
            .segment(&normalized)
            .into_iter()
            .map(|t| t.replace(WORD_JOINER, " "))
            .collect();
        let mut tokens = merge_split_tokens(base);
        if self.filter_stopwords {
            tokens.retain(|t| !self.stopwords.contains(t));
        }
        tokens
    }
}
