//! Duplicate detection and best-version resolution for document stores.
//!
//! docsweep finds documents that were imported more than once under the same
//! name (Obsidian vaults, Drive exports, chat archives all end up in one
//! Weaviate class), picks the best version of each, and deletes the rest.
//!
//! Each duplicate group is resolved to exactly one keep:
//!
//! | Situation | Match kind | Reason |
//! |-----------|------------|--------|
//! | Copy of the kept version | Exact | `Identical content (hash match, kept <id>)` |
//! | Different content, same name | Heuristic | `Duplicate (kept better version <id>)` |
//!
//! Heuristic deletes carry an advisory similarity note; similarity never decides
//! anything on its own.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`dedup`]: The resolution engine: fingerprints, similarity, ranking, planning, execution
//! - [`gateway`]: Document store access (Weaviate, JSON snapshot)
//! - [`error`]: Gateway and pipeline error types

pub mod config;
pub mod dedup;
pub mod error;
pub mod gateway;
