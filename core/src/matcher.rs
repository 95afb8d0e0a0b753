use rayon::prelude::*;

use crate::document::{DocumentId, DocumentStatus};
use crate::error::{Error, Result};
use crate::query::Query;
use crate::store::{DocumentStore, WordFrequencies};

/// Plus words found in a document (sorted, unique) and the document status.
pub type MatchedWords<'q> = (Vec<&'q str>, DocumentStatus);

fn lookup(
    store: &DocumentStore,
    document_id: DocumentId,
) -> Result<(&WordFrequencies, DocumentStatus)> {
    match (store.forward(document_id), store.document(document_id)) {
        (Some(words), Some(data)) => Ok((words, data.status)),
        _ => Err(Error::NotFound(document_id)),
    }
}

pub(crate) fn match_document<'q>(
    store: &DocumentStore,
    query: &Query<'q>,
    document_id: DocumentId,
) -> Result<MatchedWords<'q>> {
    let (words, status) = lookup(store, document_id)?;
    if query.minus_words.iter().any(|word| words.contains_key(*word)) {
        return Ok((Vec::new(), status));
    }
    let mut matched: Vec<&'q str> =
        query.plus_words.iter().copied().filter(|word| words.contains_key(*word)).collect();
    matched.dedup();
    Ok((matched, status))
}

pub(crate) fn match_document_par<'q>(
    store: &DocumentStore,
    query: &Query<'q>,
    document_id: DocumentId,
) -> Result<MatchedWords<'q>> {
    let (words, status) = lookup(store, document_id)?;
    if query.minus_words.par_iter().any(|word| words.contains_key(*word)) {
        return Ok((Vec::new(), status));
    }
    let mut matched: Vec<&'q str> =
        query.plus_words.par_iter().copied().filter(|word| words.contains_key(*word)).collect();
    matched.par_sort_unstable();
    matched.dedup();
    Ok((matched, status))
}
