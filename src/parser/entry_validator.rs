use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ValidatorConfig;

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?](\s|$)").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").unwrap());

/// 至少一个完整句子才算有效词条
pub struct EntryValidator {
    min_chars: usize,
    min_words: usize,
}

impl EntryValidator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self {
            min_chars: config.min_chars,
            min_words: config.min_words,
        }
    }

    pub fn is_valid(&self, text: &str) -> bool {
        if text.trim().chars().count() < self.min_chars {
            return false;
        }
        if !SENTENCE_END_RE.is_match(text) {
            return false;
        }
        let words: HashSet<&str> = WORD_RE.find_iter(text).map(|m| m.as_str()).collect();
        words.len() >= self.min_words
    }
}
