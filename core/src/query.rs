//! Query parsing: raw query text into inclusion ("plus") and exclusion
//! ("minus") word lists.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::tokenizer::{is_valid_word, split_into_words};

/// Immutable set of words ignored by both indexing and queries.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// Build from any container of words. Empty entries are dropped; a word
    /// containing a control character is rejected.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(Error::InvalidArgument(format!("stop word {word:?} is invalid")));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    /// Build from a space-separated list.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// A parsed query. Both lists are sorted; they borrow from the raw query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus_words: Vec<&'q str>,
    pub minus_words: Vec<&'q str>,
}

impl<'q> Query<'q> {
    /// Drop repeated words. Relies on both lists being sorted.
    pub fn dedup(&mut self) {
        self.plus_words.dedup();
        self.minus_words.dedup();
    }
}

struct QueryWord<'q> {
    data: &'q str,
    is_minus: bool,
    is_stop: bool,
}

fn parse_query_word<'q>(text: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    let (word, is_minus) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    if word.is_empty() || word.starts_with('-') || !is_valid_word(word) {
        return Err(Error::InvalidArgument(format!("query word {text:?} is invalid")));
    }
    Ok(QueryWord { data: word, is_minus, is_stop: stop_words.contains(word) })
}

/// Parse `text` into a [`Query`]. Stop words are dropped silently; the lists
/// are sorted but not deduplicated.
pub fn parse_query<'q>(text: &'q str, stop_words: &StopWords) -> Result<Query<'q>> {
    let mut query = Query::default();
    for word in split_into_words(text) {
        let word = parse_query_word(word, stop_words)?;
        if word.is_stop {
            continue;
        }
        if word.is_minus {
            query.minus_words.push(word.data);
        } else {
            query.plus_words.push(word.data);
        }
    }
    query.plus_words.sort_unstable();
    query.minus_words.sort_unstable();
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_words() -> StopWords {
        StopWords::from_text("и в на").unwrap()
    }

    #[test]
    fn splits_plus_and_minus_words() {
        let query = parse_query("пушистый кот -модный", &stop_words()).unwrap();
        assert_eq!(query.plus_words, vec!["кот", "пушистый"]);
        assert_eq!(query.minus_words, vec!["модный"]);
    }

    #[test]
    fn drops_stop_words_in_both_roles() {
        let query = parse_query("кот и -в хвост", &stop_words()).unwrap();
        assert_eq!(query.plus_words, vec!["кот", "хвост"]);
        assert!(query.minus_words.is_empty());
    }

    #[test]
    fn keeps_duplicates_until_dedup() {
        let mut query = parse_query("кот кот -хвост -хвост", &stop_words()).unwrap();
        assert_eq!(query.plus_words, vec!["кот", "кот"]);
        query.dedup();
        assert_eq!(query.plus_words, vec!["кот"]);
        assert_eq!(query.minus_words, vec!["хвост"]);
    }

    #[test]
    fn rejects_malformed_words() {
        let stop = stop_words();
        for raw in ["кот -", "--кот", "ко\u{1}т", "-ко\u{12}т"] {
            assert!(
                matches!(parse_query(raw, &stop), Err(Error::InvalidArgument(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_query_is_empty() {
        let query = parse_query("   ", &stop_words()).unwrap();
        assert_eq!(query, Query::default());
    }

    #[test]
    fn stop_words_reject_control_characters() {
        assert!(StopWords::new(["ok", "b\u{3}ad"]).is_err());
        let stop = StopWords::new(["", "a", "a"]).unwrap();
        assert_eq!(stop.words.len(), 1);
    }
}
