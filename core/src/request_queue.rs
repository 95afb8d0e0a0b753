//! Tracks how many of the most recent search requests returned nothing.

use std::collections::VecDeque;

use crate::config::REQUEST_WINDOW;
use crate::document::Document;
use crate::error::Result;
use crate::ranking::DocumentPredicate;
use crate::search_server::{ExecutionPolicy, SearchServer};

/// Sliding window over the outcome (empty or not) of the last `capacity`
/// requests.
#[derive(Debug, Clone)]
pub struct NoResultWindow {
    requests: VecDeque<bool>,
    capacity: usize,
    no_result_requests: usize,
}

impl Default for NoResultWindow {
    fn default() -> Self {
        Self::new(REQUEST_WINDOW)
    }
}

impl NoResultWindow {
    pub fn new(capacity: usize) -> Self {
        Self { requests: VecDeque::with_capacity(capacity), capacity, no_result_requests: 0 }
    }

    /// Record one request, evicting the oldest once the window is full.
    pub fn record(&mut self, is_empty: bool) {
        if self.capacity == 0 {
            return;
        }
        if self.requests.len() == self.capacity {
            if let Some(true) = self.requests.pop_front() {
                self.no_result_requests -= 1;
            }
        }
        if is_empty {
            self.no_result_requests += 1;
        }
        self.requests.push_back(is_empty);
    }

    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }
}

/// Runs searches against a server and counts the ones with no results.
pub struct RequestQueue<'s> {
    server: &'s SearchServer,
    window: NoResultWindow,
}

impl<'s> RequestQueue<'s> {
    pub fn new(server: &'s SearchServer) -> Self {
        Self { server, window: NoResultWindow::default() }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let documents = self.server.find_top_documents(raw_query)?;
        self.window.record(documents.is_empty());
        Ok(documents)
    }

    pub fn add_find_request_with<P>(
        &mut self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: P,
    ) -> Result<Vec<Document>>
    where
        P: DocumentPredicate,
    {
        let documents = self.server.find_top_documents_with(policy, raw_query, filter)?;
        self.window.record(documents.is_empty());
        Ok(documents)
    }

    pub fn no_result_requests(&self) -> usize {
        self.window.no_result_requests()
    }
}
