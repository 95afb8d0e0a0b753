//! Public entry point: a [`DocumentStore`] plus ranking and matching.

use serde::{Deserialize, Serialize};
use std::collections::btree_set;

use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::Result;
use crate::matcher::{self, MatchedWords};
use crate::query::{parse_query, StopWords};
use crate::ranking::{self, DocumentPredicate};
use crate::store::{DocumentData, DocumentStore, WordFrequencies};

/// Whether an operation may fan out over the rayon thread pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

impl ExecutionPolicy {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            ExecutionPolicy::Parallel
        } else {
            ExecutionPolicy::Sequential
        }
    }
}

/// In-memory TF-IDF search engine.
///
/// Mutation (`add_document`, `remove_document*`, duplicate removal) takes
/// `&mut self`; wrap the server in a lock to share it between writers and
/// concurrent readers.
#[derive(Debug, Default)]
pub struct SearchServer {
    store: DocumentStore,
}

impl SearchServer {
    pub fn new(stop_words: StopWords) -> Self {
        Self { store: DocumentStore::new(stop_words) }
    }

    /// Build a server from a container of stop words.
    pub fn with_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::new(StopWords::new(stop_words)?))
    }

    /// Build a server from space-separated stop words.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Ok(Self::new(StopWords::from_text(text)?))
    }

    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        self.store.add_document(document_id, text, status, ratings)
    }

    pub fn remove_document(&mut self, document_id: DocumentId) {
        self.store.remove_document(document_id);
    }

    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocumentId) {
        match policy {
            ExecutionPolicy::Sequential => self.store.remove_document(document_id),
            ExecutionPolicy::Parallel => self.store.remove_document_par(document_id),
        }
    }

    /// Top documents with status [`DocumentStatus::Actual`], computed sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, DocumentStatus::Actual)
    }

    /// Top documents accepted by `filter`: at most
    /// [`MAX_RESULT_DOCUMENT_COUNT`](crate::config::MAX_RESULT_DOCUMENT_COUNT),
    /// most relevant first.
    pub fn find_top_documents_with<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: P,
    ) -> Result<Vec<Document>>
    where
        P: DocumentPredicate,
    {
        let mut query = parse_query(raw_query, self.store.stop_words())?;
        query.dedup();

        let mut documents = match policy {
            ExecutionPolicy::Sequential => {
                let mut documents = ranking::find_all_documents(&self.store, &query, &filter);
                ranking::sort_by_relevance(&mut documents);
                documents
            }
            ExecutionPolicy::Parallel => {
                let mut documents = ranking::find_all_documents_par(&self.store, &query, &filter);
                ranking::sort_by_relevance_par(&mut documents);
                documents
            }
        };
        tracing::trace!(raw_query, ?policy, matched = documents.len(), "ranked documents");
        ranking::truncate_top(&mut documents);
        Ok(documents)
    }

    /// Plus words of `raw_query` present in the document, or none if the
    /// document contains a minus word.
    pub fn match_document<'q>(
        &self,
        raw_query: &'q str,
        document_id: DocumentId,
    ) -> Result<MatchedWords<'q>> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    pub fn match_document_with<'q>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &'q str,
        document_id: DocumentId,
    ) -> Result<MatchedWords<'q>> {
        let query = parse_query(raw_query, self.store.stop_words())?;
        match policy {
            ExecutionPolicy::Sequential => {
                matcher::match_document(&self.store, &query, document_id)
            }
            ExecutionPolicy::Parallel => {
                matcher::match_document_par(&self.store, &query, document_id)
            }
        }
    }

    pub fn document_count(&self) -> usize {
        self.store.document_count()
    }

    /// Term frequencies of a document; empty if the id is unknown.
    pub fn word_frequencies(&self, document_id: DocumentId) -> WordFrequencies {
        self.store.word_frequencies(document_id)
    }

    pub fn document_ids(&self) -> std::iter::Copied<btree_set::Iter<'_, DocumentId>> {
        self.store.document_ids()
    }

    pub fn document(&self, document_id: DocumentId) -> Option<&DocumentData> {
        self.store.document(document_id)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocumentId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, DocumentId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids()
    }
}
