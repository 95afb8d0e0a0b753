//! TF-IDF scoring over a [`DocumentStore`].
//!
//! Relevance of a document is the sum over matching plus words of
//! `tf(word, doc) * ln(N / df(word))`. Documents containing any minus word
//! are dropped. The parallel path accumulates through a [`ConcurrentMap`] and
//! returns the same set of documents.

use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::concurrent_map::ConcurrentMap;
use crate::config::{DEFAULT_SHARD_COUNT, MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::query::Query;
use crate::store::DocumentStore;

/// Decides whether a document may appear in search results.
///
/// Implemented for any `Fn(id, status, rating) -> bool` and for
/// [`DocumentStatus`], which accepts documents with that exact status.
pub trait DocumentPredicate: Sync {
    fn accept(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentPredicate for F
where
    F: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
{
    fn accept(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool {
        self(document_id, status, rating)
    }
}

impl DocumentPredicate for DocumentStatus {
    fn accept(&self, _document_id: DocumentId, status: DocumentStatus, _rating: i32) -> bool {
        *self == status
    }
}

pub(crate) fn find_all_documents<P>(
    store: &DocumentStore,
    query: &Query<'_>,
    predicate: &P,
) -> Vec<Document>
where
    P: DocumentPredicate + ?Sized,
{
    let mut document_to_relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();
    for word in &query.plus_words {
        let Some(postings) = store.postings(word) else {
            continue;
        };
        let idf = store.inverse_document_freq(postings.len());
        for (&document_id, &tf) in postings {
            let Some(data) = store.document(document_id) else {
                continue;
            };
            if predicate.accept(document_id, data.status, data.rating) {
                *document_to_relevance.entry(document_id).or_insert(0.0) += tf * idf;
            }
        }
    }

    for word in &query.minus_words {
        if let Some(postings) = store.postings(word) {
            for document_id in postings.keys() {
                document_to_relevance.remove(document_id);
            }
        }
    }

    collect_documents(store, document_to_relevance)
}

pub(crate) fn find_all_documents_par<P>(
    store: &DocumentStore,
    query: &Query<'_>,
    predicate: &P,
) -> Vec<Document>
where
    P: DocumentPredicate + ?Sized,
{
    let document_to_relevance = ConcurrentMap::<f64>::new(DEFAULT_SHARD_COUNT);
    query.plus_words.par_iter().for_each(|word| {
        let Some(postings) = store.postings(word) else {
            return;
        };
        let idf = store.inverse_document_freq(postings.len());
        for (&document_id, &tf) in postings {
            let Some(data) = store.document(document_id) else {
                continue;
            };
            if predicate.accept(document_id, data.status, data.rating) {
                document_to_relevance.add(document_id, tf * idf);
            }
        }
    });

    query.minus_words.par_iter().for_each(|word| {
        if let Some(postings) = store.postings(word) {
            for &document_id in postings.keys() {
                document_to_relevance.remove(document_id);
            }
        }
    });

    collect_documents(store, document_to_relevance.into_ordinary_map())
}

fn collect_documents(store: &DocumentStore, relevance: BTreeMap<DocumentId, f64>) -> Vec<Document> {
    relevance
        .into_iter()
        .filter_map(|(id, relevance)| {
            store.document(id).map(|data| Document::new(id, relevance, data.rating))
        })
        .collect()
}

fn by_relevance(lhs: &Document, rhs: &Document) -> Ordering {
    rhs.relevance
        .total_cmp(&lhs.relevance)
        .then_with(|| rhs.rating.cmp(&lhs.rating))
        .then_with(|| lhs.id.cmp(&rhs.id))
}

/// Whether `lhs` may sit directly above `rhs` in a result list. Near-equal
/// relevance compares by rating, then id; anything else by relevance. Every
/// pair of distinct documents is ordered one way or the other, but the
/// relation is not transitive.
fn ranks_above(lhs: &Document, rhs: &Document) -> bool {
    if (lhs.relevance - rhs.relevance).abs() < RELEVANCE_EPSILON {
        rhs.rating.cmp(&lhs.rating).then_with(|| lhs.id.cmp(&rhs.id)) == Ordering::Less
    } else {
        lhs.relevance > rhs.relevance
    }
}

/// Rebuilds the list so that every adjacent pair satisfies [`ranks_above`].
///
/// Documents are inserted one at a time in relevance order. A document goes
/// to the end when the current last one ranks above it, to the front when it
/// ranks above the first one, and otherwise between some `path[lo]` above it
/// and `path[hi]` below it, found by bisection.
fn order_near_ties(documents: &mut [Document]) {
    let mut path: Vec<Document> = Vec::with_capacity(documents.len());
    for &document in documents.iter() {
        if path.last().map_or(true, |last| ranks_above(last, &document)) {
            path.push(document);
            continue;
        }
        if ranks_above(&document, &path[0]) {
            path.insert(0, document);
            continue;
        }
        let (mut lo, mut hi) = (0, path.len() - 1);
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if ranks_above(&path[mid], &document) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        path.insert(hi, document);
    }
    documents.copy_from_slice(&path);
}

/// Sort by descending relevance; near-equal relevance is ordered by
/// descending rating, then ascending id.
pub fn sort_by_relevance(documents: &mut [Document]) {
    documents.sort_by(by_relevance);
    order_near_ties(documents);
}

pub(crate) fn sort_by_relevance_par(documents: &mut [Document]) {
    documents.par_sort_by(by_relevance);
    order_near_ties(documents);
}

pub(crate) fn truncate_top(documents: &mut Vec<Document>) {
    documents.truncate(MAX_RESULT_DOCUMENT_COUNT);
}
