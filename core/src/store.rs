//! Document storage with forward (document -> word -> tf) and inverted
//! (word -> document -> tf) indexes kept in lock-step.
//!
//! Words are interned as `Arc<str>`: both indexes share one allocation per
//! distinct word, independent of the document text that produced it.

use rayon::prelude::*;
use std::collections::{btree_set, BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::document::{DocumentId, DocumentStatus};
use crate::error::{Error, Result};
use crate::query::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};

pub type Term = Arc<str>;

/// Normalized term frequencies of one document.
pub type WordFrequencies = BTreeMap<Term, f64>;

/// Per-word postings: document -> normalized term frequency.
pub type Postings = BTreeMap<DocumentId, f64>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentData {
    pub rating: i32,
    pub status: DocumentStatus,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    stop_words: StopWords,
    documents: BTreeMap<DocumentId, DocumentData>,
    word_frequencies: BTreeMap<DocumentId, WordFrequencies>,
    word_to_document_freqs: BTreeMap<Term, Postings>,
    document_ids: BTreeSet<DocumentId>,
}

impl DocumentStore {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words, ..Self::default() }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(Error::InvalidArgument(format!("document id {document_id} is negative")));
        }
        if self.documents.contains_key(&document_id) {
            return Err(Error::InvalidArgument(format!("document id {document_id} already exists")));
        }
        let words = self.split_into_words_no_stop(text)?;

        let mut frequencies = WordFrequencies::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in words {
                let term = self.intern(word);
                *frequencies.entry(term.clone()).or_insert(0.0) += inv_word_count;
                *self
                    .word_to_document_freqs
                    .entry(term)
                    .or_default()
                    .entry(document_id)
                    .or_insert(0.0) += inv_word_count;
            }
        }

        let rating = compute_average_rating(ratings);
        tracing::debug!(document_id, rating, words = frequencies.len(), "document added");
        self.word_frequencies.insert(document_id, frequencies);
        self.documents.insert(document_id, DocumentData { rating, status, text: text.to_string() });
        self.document_ids.insert(document_id);
        Ok(())
    }

    /// Remove a document and every index entry pointing at it. Unknown ids are
    /// ignored.
    pub fn remove_document(&mut self, document_id: DocumentId) {
        let Some(frequencies) = self.word_frequencies.remove(&document_id) else {
            return;
        };
        for term in frequencies.keys() {
            self.detach_posting(term, document_id);
        }
        self.forget(document_id);
    }

    /// Same outcome as [`remove_document`](Self::remove_document). Collecting
    /// the affected words runs on the rayon pool; the inverted index itself is
    /// only mutated from the calling thread.
    pub fn remove_document_par(&mut self, document_id: DocumentId) {
        let Some(frequencies) = self.word_frequencies.remove(&document_id) else {
            return;
        };
        let terms: Vec<Term> = frequencies.into_par_iter().map(|(term, _)| term).collect();
        for term in &terms {
            self.detach_posting(term, document_id);
        }
        self.forget(document_id);
    }

    fn detach_posting(&mut self, term: &str, document_id: DocumentId) {
        if let Some(postings) = self.word_to_document_freqs.get_mut(term) {
            postings.remove(&document_id);
            if postings.is_empty() {
                self.word_to_document_freqs.remove(term);
            }
        }
    }

    fn forget(&mut self, document_id: DocumentId) {
        self.document_ids.remove(&document_id);
        self.documents.remove(&document_id);
        tracing::debug!(document_id, "document removed");
    }

    /// Term frequencies of a document, or an empty map if it does not exist.
    pub fn word_frequencies(&self, document_id: DocumentId) -> WordFrequencies {
        self.word_frequencies.get(&document_id).cloned().unwrap_or_default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> std::iter::Copied<btree_set::Iter<'_, DocumentId>> {
        self.document_ids.iter().copied()
    }

    pub fn contains(&self, document_id: DocumentId) -> bool {
        self.document_ids.contains(&document_id)
    }

    pub fn document(&self, document_id: DocumentId) -> Option<&DocumentData> {
        self.documents.get(&document_id)
    }

    /// Number of live documents containing `word`.
    pub fn document_frequency(&self, word: &str) -> usize {
        self.word_to_document_freqs.get(word).map_or(0, BTreeMap::len)
    }

    pub(crate) fn postings(&self, word: &str) -> Option<&Postings> {
        self.word_to_document_freqs.get(word)
    }

    pub(crate) fn forward(&self, document_id: DocumentId) -> Option<&WordFrequencies> {
        self.word_frequencies.get(&document_id)
    }

    /// `ln(N / df)` for a word found in `document_frequency` documents.
    pub(crate) fn inverse_document_freq(&self, document_frequency: usize) -> f64 {
        (self.document_count() as f64 / document_frequency as f64).ln()
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(Error::InvalidArgument(format!("word {word:?} is invalid")));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    fn intern(&self, word: &str) -> Term {
        match self.word_to_document_freqs.get_key_value(word) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(word),
        }
    }
}

fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}
