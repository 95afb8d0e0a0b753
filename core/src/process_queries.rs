use rayon::prelude::*;

use crate::document::Document;
use crate::error::Result;
use crate::search_server::SearchServer;

/// Run every query in parallel. Results keep the order of `queries`.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    queries.par_iter().map(|query| server.find_top_documents(query.as_ref())).collect()
}

/// Like [`process_queries`], flattened into one sequence.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStatus;
    use crate::error::Error;

    fn server() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in texts.iter().enumerate() {
            server.add_document(id as i32 + 1, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        server
    }

    #[test]
    fn keeps_query_order() {
        let server = server();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let results = process_queries(&server, &queries).unwrap();
        assert_eq!(results.len(), 3);
        for (query, found) in queries.iter().zip(&results) {
            assert_eq!(found, &server.find_top_documents(query).unwrap());
        }
        assert_eq!(results.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 5, 2]);
    }

    #[test]
    fn joined_flattens_in_order() {
        let server = server();
        let queries = vec!["nasty rat -not".to_string(), "curly hair".to_string()];
        let joined = process_queries_joined(&server, &queries).unwrap();
        let ids: Vec<_> = joined.iter().map(|d| d.id).collect();
        let mut expected: Vec<_> = server.find_top_documents("nasty rat -not").unwrap().iter().map(|d| d.id).collect();
        expected.extend(server.find_top_documents("curly hair").unwrap().iter().map(|d| d.id));
        assert_eq!(ids, expected);
    }

    #[test]
    fn invalid_query_fails_batch() {
        let server = server();
        assert!(matches!(process_queries(&server, &["rat", "-"]), Err(Error::InvalidArgument(_))));
    }
}
