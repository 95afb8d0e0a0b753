//! In-memory document search with TF-IDF ranking.
//!
//! Documents are split on spaces into words; stop words are dropped and the
//! rest are kept in a forward and an inverted index. Queries consist of plus
//! words (scored) and `-minus` words (exclude any document containing them).

pub mod concurrent_map;
pub mod config;
pub mod dedup;
pub mod document;
pub mod error;
mod matcher;
pub mod process_queries;
pub mod query;
pub mod ranking;
pub mod request_queue;
pub mod search_server;
pub mod store;
pub mod tokenizer;

pub use concurrent_map::ConcurrentMap;
pub use dedup::remove_duplicates;
pub use document::{Document, DocumentId, DocumentStatus, MatchReport};
pub use error::{Error, Result};
pub use matcher::MatchedWords;
pub use query::{parse_query, Query, StopWords};
pub use ranking::DocumentPredicate;
pub use request_queue::{NoResultWindow, RequestQueue};
pub use search_server::{ExecutionPolicy, SearchServer};
pub use store::{DocumentData, DocumentStore, Term, WordFrequencies};
