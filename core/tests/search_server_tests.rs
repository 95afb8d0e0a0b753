use search_core::{
    remove_duplicates, DocumentId, DocumentStatus, Error, ExecutionPolicy, MatchReport, SearchServer,
};

fn cats_server() -> SearchServer {
    let mut server = SearchServer::from_stop_words_text("и в на").unwrap();
    server
        .add_document(0, "белый кот и модный ошейник", DocumentStatus::Actual, &[8, -3])
        .unwrap();
    server
        .add_document(1, "пушистый кот пушистый хвост", DocumentStatus::Actual, &[7, 2, 7])
        .unwrap();
    server
        .add_document(2, "ухоженный пёс выразительные глаза", DocumentStatus::Actual, &[5, -12, 2, 1])
        .unwrap();
    server
        .add_document(3, "ухоженный скворец евгений", DocumentStatus::Banned, &[9])
        .unwrap();
    server
}

fn large_server() -> SearchServer {
    let dictionary = [
        "cat", "dog", "rat", "tail", "collar", "fancy", "curly", "big", "small", "grey", "white", "black",
        "pet", "nasty", "funny", "bird", "sparrow", "fish", "eyes", "hair",
    ];
    let mut server = SearchServer::from_stop_words_text("and with in").unwrap();
    for id in 0..300 {
        let words: Vec<&str> = (0..(3 + id % 7))
            .map(|k| dictionary[(id * 31 + k * 17 + k * k) as usize % dictionary.len()])
            .collect();
        let status = if id % 11 == 0 { DocumentStatus::Irrelevant } else { DocumentStatus::Actual };
        server.add_document(id, &words.join(" "), status, &[id % 13, -(id % 5)]).unwrap();
    }
    server
}

#[test]
fn excludes_documents_with_minus_words() {
    let mut server = SearchServer::from_stop_words_text("и в").unwrap();
    server
        .add_document(0, "белый кот и модный ошейник", DocumentStatus::Actual, &[8, -3])
        .unwrap();
    server
        .add_document(1, "пушистый кот пушистый хвост", DocumentStatus::Actual, &[7, 2, 7])
        .unwrap();

    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let found = server
            .find_top_documents_with(policy, "пушистый кот -модный", DocumentStatus::Actual)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert_eq!(found[0].rating, 5);
        // "пушистый" occurs in one of two documents, "кот" in both (idf 0).
        let expected = 0.5 * 2f64.ln() + 0.25 * 1f64.ln();
        assert!((found[0].relevance - expected).abs() < 1e-9);
    }
}

#[test]
fn default_search_uses_actual_status() {
    let server = cats_server();
    let found = server.find_top_documents("пушистый ухоженный кот").unwrap();
    assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 0, 2]);

    let banned = server
        .find_top_documents_with(ExecutionPolicy::Sequential, "пушистый ухоженный кот", DocumentStatus::Banned)
        .unwrap();
    assert_eq!(banned.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3]);

    let even = server
        .find_top_documents_with(
            ExecutionPolicy::Parallel,
            "пушистый ухоженный кот",
            |id: DocumentId, _: DocumentStatus, _: i32| id % 2 == 0,
        )
        .unwrap();
    assert_eq!(even.iter().map(|d| d.id).collect::<Vec<_>>(), vec![0, 2]);
}

#[test]
fn equal_relevance_breaks_tie_by_rating() {
    let server = cats_server();
    // All three score 0.25 * ln 2; ratings are 5, 2 and -1.
    let found = server.find_top_documents("ухоженный кот").unwrap();
    let ids: Vec<_> = found.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 0, 2]);
}

#[test]
fn duplicate_query_words_do_not_change_scores() {
    let server = cats_server();
    assert_eq!(
        server.find_top_documents("кот кот пушистый").unwrap(),
        server.find_top_documents("пушистый кот").unwrap()
    );
}

#[test]
fn never_more_than_five_results_and_sorted() {
    let server = large_server();
    for query in ["cat dog", "fancy collar -rat", "pet funny nasty", "sparrow bird fish eyes"] {
        for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
            let found = server.find_top_documents_with(policy, query, DocumentStatus::Actual).unwrap();
            assert!(found.len() <= 5);
            for pair in found.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                if (a.relevance - b.relevance).abs() < 1e-6 {
                    assert!(a.rating >= b.rating, "{query}: {a} before {b}");
                } else {
                    assert!(a.relevance > b.relevance, "{query}: {a} before {b}");
                }
            }
        }
    }
}

#[test]
fn sequential_and_parallel_agree() {
    let server = large_server();
    for query in ["cat dog -rat", "fancy curly collar", "grey white black -pet", "hair eyes tail fish"] {
        let seq = server
            .find_top_documents_with(ExecutionPolicy::Sequential, query, |_: DocumentId, _: DocumentStatus, _: i32| true)
            .unwrap();
        let par = server
            .find_top_documents_with(ExecutionPolicy::Parallel, query, |_: DocumentId, _: DocumentStatus, _: i32| true)
            .unwrap();
        assert_eq!(seq.len(), par.len(), "{query}");
        for (s, p) in seq.iter().zip(&par) {
            assert_eq!(s.id, p.id, "{query}");
            assert!((s.relevance - p.relevance).abs() < 1e-6, "{query}");
        }
    }
}

#[test]
fn term_frequencies_sum_to_one() {
    let server = large_server();
    for id in &server {
        let sum: f64 = server.word_frequencies(id).values().sum();
        assert!((sum - 1.0).abs() < 1e-9, "document {id}");
    }
    assert!(server.word_frequencies(10_000).is_empty());
}

#[test]
fn match_document_in_both_modes() {
    let server = cats_server();
    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let (words, status) = server.match_document_with(policy, "пушистый кот хвост -ошейник", 1).unwrap();
        assert_eq!(words, vec!["кот", "пушистый", "хвост"]);
        assert_eq!(status, DocumentStatus::Actual);

        let (words, _) = server.match_document_with(policy, "пушистый кот хвост -ошейник", 0).unwrap();
        assert!(words.is_empty());

        let (words, status) = server.match_document_with(policy, "скворец", 3).unwrap();
        assert_eq!(words, vec!["скворец"]);
        assert_eq!(status, DocumentStatus::Banned);

        assert!(matches!(server.match_document_with(policy, "кот", 42), Err(Error::NotFound(42))));
        assert!(matches!(server.match_document_with(policy, "кот -", 1), Err(Error::InvalidArgument(_))));
    }

    let (words, status) = server.match_document("кот белый", 0).unwrap();
    let report = MatchReport { document_id: 0, words: &words, status };
    assert_eq!(report.to_string(), "{ document_id = 0, status = 0, words = белый кот}");
}

#[test]
fn invalid_queries_are_rejected() {
    let server = cats_server();
    for query in ["кот --пушистый", "кот -", "ко\u{2}т"] {
        assert!(matches!(server.find_top_documents(query), Err(Error::InvalidArgument(_))), "{query:?}");
    }
}

#[test]
fn invalid_documents_are_rejected() {
    let mut server = SearchServer::default();
    assert!(matches!(
        server.add_document(-1, "text", DocumentStatus::Actual, &[]),
        Err(Error::InvalidArgument(_))
    ));
    server.add_document(1, "text", DocumentStatus::Actual, &[]).unwrap();
    assert!(matches!(
        server.add_document(1, "text", DocumentStatus::Actual, &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(server.add_document(2, "bad\u{1f}text", DocumentStatus::Actual, &[]).is_err());
    assert_eq!(server.document_count(), 1);

    assert!(SearchServer::with_stop_words(["ok", "no\u{10}pe"]).is_err());
}

#[test]
fn remove_document_purges_indexes() {
    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let mut server = cats_server();
        let before = server.document_count();
        server.remove_document_with(policy, 1);

        assert_eq!(server.document_count(), before - 1);
        assert!(server.word_frequencies(1).is_empty());
        assert!(server.document(1).is_none());
        assert_eq!(server.store().document_frequency("пушистый"), 0);
        assert_eq!(server.store().document_frequency("кот"), 1);
        assert!(server.find_top_documents("пушистый хвост").unwrap().is_empty());
        assert!(matches!(server.match_document("кот", 1), Err(Error::NotFound(1))));

        server.remove_document_with(policy, 1);
        assert_eq!(server.document_count(), before - 1);
    }
}

#[test]
fn remove_duplicates_keeps_lowest_id() {
    let mut server = SearchServer::default();
    server.add_document(5, "a b c", DocumentStatus::Actual, &[]).unwrap();
    server.add_document(6, "a b c", DocumentStatus::Actual, &[]).unwrap();
    server.add_document(7, "c b a a", DocumentStatus::Actual, &[]).unwrap();
    server.add_document(8, "a b", DocumentStatus::Actual, &[]).unwrap();

    assert_eq!(remove_duplicates(&mut server), vec![6, 7]);
    assert_eq!(server.document_ids().collect::<Vec<_>>(), vec![5, 8]);
}
