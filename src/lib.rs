//! # Standards Hub
//!
//! Aggregates documentation standards from a local directory, HTTP
//! endpoints, and git repositories, normalizes them into one document
//! model, caches the corpus with a TTL, and answers lookups, category
//! listings, and keyword-relevance searches.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │   Sources   │──▶│  Normalizer │──▶│   Manager    │
//! │ Local/HTTP/ │   │ front matter│   │ corpus + TTL │
//! │     Git     │   │  + path ids │   │    cache     │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!                             ┌──────────────┼──────────────┐
//!                             ▼              ▼              ▼
//!                         by id         by category      search
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! standards sources                 # show configured sources
//! standards categories              # list categories
//! standards list --category frontend
//! standards search "vue component"
//! standards get frontend-vue-components
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`models`] | Core data types |
//! | [`frontmatter`] | Front matter splitting |
//! | [`markdown`] | Markdown → document normalization |
//! | [`traits`] | `Source` trait and registry |
//! | [`source_local`] | Local directory source |
//! | [`source_remote`] | HTTP JSON / raw markdown source |
//! | [`source_git`] | Git repository source (REST API) |
//! | [`cache`] | TTL cache |
//! | [`search`] | Relevance ranking |
//! | [`manager`] | Aggregator |
//! | [`commands`] | CLI command bodies |

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod http;
pub mod manager;
pub mod markdown;
pub mod models;
pub mod search;
pub mod source_git;
pub mod source_local;
pub mod source_remote;
pub mod sources;
pub mod traits;
