//! Engine-wide constants.
//!
//! Runtime settings (stop words, bind address, input paths) are handled by
//! the `indexer` and `server` binaries through CLI arguments and environment
//! variables.

/// Maximum number of documents returned by a single top-documents query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevance values closer than this are treated as equal when ranking;
/// the document rating decides their order instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Number of independently locked shards used by the parallel scorer.
///
/// Chosen relative to expected concurrency (worker threads), not corpus size.
pub const DEFAULT_SHARD_COUNT: usize = 15;

/// Number of most recent requests tracked by the request queue
/// (one per minute over a day).
pub const REQUEST_WINDOW: usize = 1440;
