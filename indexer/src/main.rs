use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use search_core::process_queries::process_queries_joined;
use search_core::{
    remove_duplicates, DocumentId, DocumentStatus, ExecutionPolicy, MatchReport, RequestQueue,
    SearchServer,
};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocumentId,
    #[serde(alias = "body")]
    text: String,
    #[serde(default)]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}

#[derive(Parser)]
#[command(name = "search-indexer")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Input path (JSON/JSONL file or directory)
    #[arg(long)]
    input: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for each query
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Query text; may be repeated
        #[arg(long = "query", required = true, allow_hyphen_values = true)]
        queries: Vec<String>,
        /// Only return documents with this status
        #[arg(long, default_value = "actual")]
        status: DocumentStatus,
        /// Score each query on the rayon thread pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
        /// Run all queries in parallel and print one joined result list
        #[arg(long, default_value_t = false)]
        joined: bool,
        /// Remove duplicate documents before searching
        #[arg(long, default_value_t = false)]
        dedupe: bool,
    },
    /// Print the query words found in every document
    Match {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long, allow_hyphen_values = true)]
        query: String,
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Remove documents whose word sets duplicate an earlier document
    Dedupe {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, queries, status, parallel, joined, dedupe } => {
            let mut server = load_server(&corpus)?;
            if dedupe {
                report_duplicates(&mut server);
            }
            if joined {
                search_joined(&server, &queries)
            } else {
                search(&server, &queries, status, ExecutionPolicy::from_parallel(parallel));
                Ok(())
            }
        }
        Commands::Match { corpus, query, parallel } => {
            let server = load_server(&corpus)?;
            match_documents(&server, &query, ExecutionPolicy::from_parallel(parallel));
            Ok(())
        }
        Commands::Dedupe { corpus } => {
            let mut server = load_server(&corpus)?;
            report_duplicates(&mut server);
            println!("{} documents left", server.document_count());
            Ok(())
        }
    }
}

fn load_server(corpus: &CorpusArgs) -> Result<SearchServer> {
    let mut server = SearchServer::from_stop_words_text(&corpus.stop_words)?;
    let added = load_documents(Path::new(&corpus.input), &mut server)?;
    tracing::info!(added, input = %corpus.input, "documents loaded");
    Ok(server)
}

/// Add every document found under `input` to `server`. Documents the server
/// rejects are logged and skipped. Returns the number of documents added.
fn load_documents(input: &Path, server: &mut SearchServer) -> Result<usize> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            let extension = p.extension().and_then(|s| s.to_str());
            if p.is_file() && matches!(extension, Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }

    let mut added = 0;
    for file in files {
        let docs = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file)?
        } else {
            read_json(&file)?
        };
        for doc in docs {
            added += usize::from(ingest_doc(doc, server));
        }
    }
    Ok(added)
}

fn read_jsonl(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn read_json(file: &Path) -> Result<Vec<InputDoc>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => {
            arr.into_iter().map(serde_json::from_value).collect::<Result<Vec<InputDoc>, _>>()?
        }
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

fn ingest_doc(doc: InputDoc, server: &mut SearchServer) -> bool {
    match server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(document_id = doc.id, error = %e, "failed to add document");
            false
        }
    }
}

fn search(
    server: &SearchServer,
    queries: &[String],
    status: DocumentStatus,
    policy: ExecutionPolicy,
) {
    let mut queue = RequestQueue::new(server);
    for query in queries {
        let start = Instant::now();
        println!("Search results for query: {query}");
        match queue.add_find_request_with(policy, query, status) {
            Ok(documents) => {
                for document in documents {
                    println!("{document}");
                }
            }
            Err(e) => tracing::warn!(query = %query, error = %e, "search failed"),
        }
        tracing::info!(query = %query, took_s = start.elapsed().as_secs_f64(), "operation time");
    }
    println!("Requests without results: {}", queue.no_result_requests());
}

fn search_joined(server: &SearchServer, queries: &[String]) -> Result<()> {
    let start = Instant::now();
    for document in process_queries_joined(server, queries)? {
        println!("{document}");
    }
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(queries = queries.len(), took_s, "operation time");
    Ok(())
}

fn match_documents(server: &SearchServer, query: &str, policy: ExecutionPolicy) {
    let start = Instant::now();
    println!("Matching documents for query: {query}");
    for document_id in server {
        match server.match_document_with(policy, query, document_id) {
            Ok((words, status)) => {
                println!("{}", MatchReport { document_id, words: &words, status });
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "matching failed");
                break;
            }
        }
    }
    tracing::info!(query = %query, took_s = start.elapsed().as_secs_f64(), "operation time");
}

fn report_duplicates(server: &mut SearchServer) {
    for document_id in remove_duplicates(server) {
        println!("Found duplicate document id {document_id}");
    }
}
