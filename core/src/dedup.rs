use std::collections::{BTreeSet, HashSet};

use crate::document::DocumentId;
use crate::search_server::SearchServer;
use crate::store::Term;

/// Remove every document whose set of distinct words equals that of a
/// document with a lower id. Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocumentId> {
    let ids: Vec<DocumentId> = server.document_ids().collect();
    let mut seen: HashSet<BTreeSet<Term>> = HashSet::new();
    let mut removed = Vec::new();

    for document_id in ids {
        let words: BTreeSet<Term> = server.word_frequencies(document_id).into_keys().collect();
        if !seen.insert(words) {
            tracing::info!(document_id, "found duplicate document");
            server.remove_document(document_id);
            removed.push(document_id);
        }
    }
    removed
}
