//! # Simdex CLI (`sdx`)
//!
//! The `sdx` binary drives the retrieval engine from the command line:
//! scanning a source tree, indexing it, running similarity queries, and
//! rendering project structure.
//!
//! ## Usage
//!
//! ```bash
//! sdx --config ./config/sdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sdx search "<query>" --root <dir>` | Index a tree and return the most similar chunks |
//! | `sdx index --root <dir>` | Upsert a tree into the remote vector index |
//! | `sdx tree --root <dir>` | Render the folder structure with import relationships |
//! | `sdx clear` | Drop all indexed content (local and remote) |
//!
//! Without a `SIMDEX_API_KEY` in the environment the engine operates
//! local-only: `search` indexes the tree in memory for the lifetime of
//! the invocation, and `index`/`clear` have nothing durable to talk to.

mod config;
mod engine;
mod progress;
mod remote;
mod scan;
mod structure;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use engine::{BackendState, SimilarityEngine};
use progress::ProgressMode;

/// Simdex — a code-similarity retrieval engine with a remote vector
/// backend and a local in-memory fallback.
#[derive(Parser)]
#[command(
    name = "sdx",
    about = "Simdex — code-similarity retrieval over line-chunked source files",
    version,
    long_about = "Simdex splits source files into fixed-size line chunks, maps each chunk to a \
    bag-of-words frequency vector, and answers top-k similarity queries — against a remote \
    vector-store service when an API key is configured, or a local in-memory index otherwise."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/sdx.toml`; when the file does not exist,
    /// built-in defaults apply.
    #[arg(long, global = true, default_value = "./config/sdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Find chunks similar to a query.
    ///
    /// Scans and indexes the tree under `--root`, then ranks stored
    /// chunks against the query. With a connected remote index the
    /// query runs there; otherwise the scan is local to this
    /// invocation.
    Search {
        /// The query text.
        query: String,

        /// Source tree to scan and index before querying.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Maximum number of results (defaults to `retrieval.top_k`).
        #[arg(short)]
        k: Option<usize>,

        /// Emit results as JSON instead of human-readable rows.
        #[arg(long)]
        json: bool,
    },

    /// Index a source tree into the remote vector store.
    ///
    /// Requires an API key; local-only mode has nothing durable to
    /// write to.
    Index {
        /// Source tree to scan.
        #[arg(long)]
        root: PathBuf,
    },

    /// Render the folder structure of a source tree.
    ///
    /// Shows known folders and files, with each file's resolved import
    /// relationships listed beneath it.
    Tree {
        /// Source tree to scan.
        #[arg(long)]
        root: PathBuf,
    },

    /// Drop all indexed content.
    ///
    /// Empties the in-memory index and, when connected, issues a
    /// delete-all against the remote index. This is the only removal
    /// operation — per-file deletion is not supported.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Search {
            query,
            root,
            k,
            json,
        } => {
            let engine = SimilarityEngine::connect(&config)
                .await?
                .with_reporter(ProgressMode::default_for_tty().reporter());

            if let Some(root) = &root {
                index_tree(&engine, &config, root).await?;
            } else if engine.backend_state() != BackendState::RemoteConnected {
                anyhow::bail!(
                    "Nothing to search: pass --root to index a tree, or configure {} for the remote index.",
                    config.remote.api_key_env
                );
            }

            let k = k.unwrap_or(engine.default_top_k());
            let results = engine.find_similar(&query, k).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results.");
            } else {
                for (i, m) in results.iter().enumerate() {
                    println!("{}. {}  (similarity {:.4})", i + 1, m.file_id, m.similarity);
                    for line in m.content.lines().take(4) {
                        println!("   {}", line);
                    }
                }
            }
        }

        Commands::Index { root } => {
            let engine = SimilarityEngine::connect(&config)
                .await?
                .with_reporter(ProgressMode::default_for_tty().reporter());

            if engine.backend_state() != BackendState::RemoteConnected {
                anyhow::bail!(
                    "Remote index not available: set {} and check [remote] in the config.",
                    config.remote.api_key_env
                );
            }

            let (files, chunks) = index_tree(&engine, &config, &root).await?;
            println!("index {}", root.display());
            println!("  files: {}", files);
            println!("  chunks: {}", chunks);
            println!("ok");
        }

        Commands::Tree { root } => {
            let engine = SimilarityEngine::local(&config)?;
            let (file_ids, _) = scan_into(&engine, &config, &root, false).await?;
            print!("{}", engine.folder_structure(&file_ids));
        }

        Commands::Clear => {
            let engine = SimilarityEngine::connect(&config).await?;
            engine.clear().await?;
            println!("cleared");
        }
    }

    Ok(())
}

/// Scan a tree and add every file to the engine's index.
async fn index_tree(
    engine: &SimilarityEngine,
    config: &config::Config,
    root: &std::path::Path,
) -> Result<(usize, usize)> {
    let (file_ids, chunks) = scan_into(engine, config, root, true).await?;
    Ok((file_ids.len(), chunks))
}

/// Scan a tree, seed the project structure, and optionally index each
/// file. Returns the scanned file ids and total chunk count.
async fn scan_into(
    engine: &SimilarityEngine,
    config: &config::Config,
    root: &std::path::Path,
    index: bool,
) -> Result<(Vec<String>, usize)> {
    let files = scan::scan_source_tree(root, &config.scanner)?;

    let listing: Vec<structure::ProjectFile> =
        files.iter().map(|f| f.project_file()).collect();
    engine.initialize_project_structure(&listing);

    let mut total_chunks = 0;
    let mut ids = Vec::with_capacity(files.len());
    for scanned in &files {
        let line_count = scanned.file.content.lines().count();
        total_chunks += line_count.div_ceil(config.chunking.chunk_size.max(1));
        if index {
            engine
                .add_to_index(&scanned.file, Some(&scanned.path))
                .await?;
        } else {
            // Structure-only pass still records import relationships.
            let imports =
                simdex_core::relations::resolve_imports(&scanned.file.content, &scanned.path);
            engine.record_relationships(&scanned.file.id, &scanned.path, imports);
        }
        ids.push(scanned.file.id.clone());
    }

    Ok((ids, total_chunks))
}
