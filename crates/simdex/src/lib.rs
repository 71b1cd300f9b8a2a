//! # Simdex
//!
//! A code-similarity retrieval engine for grounding LLM suggestions in
//! a project's own source. Files are split into fixed-size line chunks,
//! each chunk is mapped to a bag-of-words frequency vector, and top-k
//! queries rank stored chunks by cosine similarity — against a remote
//! vector-store service when one is configured, or a local in-memory
//! index otherwise.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌────────────────┐
//! │ Scanner  │──▶│ Chunk+Vector  │──▶│ Remote index    │
//! │ (files)  │   │   pipeline    │   │ (or in-memory)  │
//! └──────────┘   └───────────────┘   └───────┬────────┘
//!                                            │
//!                                            ▼
//!                                     top-k queries
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! sdx search "parse the config file" --root ./src
//! sdx index --root ./src            # upsert into the remote index
//! sdx tree --root ./src             # folder structure with imports
//! sdx clear                         # drop everything indexed
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`engine`] | The retrieval engine service object |
//! | [`remote`] | Remote vector-store HTTP client |
//! | [`scan`] | Filesystem scanner for the CLI |
//! | [`structure`] | Project folder tree and import relationships |
//! | [`progress`] | Indexing progress reporting |

pub mod config;
pub mod engine;
pub mod progress;
pub mod remote;
pub mod scan;
pub mod structure;
