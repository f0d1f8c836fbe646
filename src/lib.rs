//! # askcorp
//!
//! Client for a document question-answering service. PDFs are uploaded
//! through a presigned-URL handshake, their indexing status is tracked
//! locally, and questions are sent to a retrieval-augmented query service
//! whose answers come back with citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌────────────────┐
//! │   CLI    │──▶│     App     │──▶│ presign / blob │
//! │ askcorp  │   │ upload/chat │   │ query services │
//! └──────────┘   └──────┬──────┘   └────────────────┘
//!                       │
//!           ┌───────────┼────────────┐
//!           ▼           ▼            ▼
//!     ┌──────────┐ ┌─────────┐ ┌───────────┐
//!     │  SQLite  │ │ toasts  │ │ progress  │
//!     │ kv store │ │ (stderr)│ │ (stderr)  │
//!     └──────────┘ └─────────┘ └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! askcorp settings set --presign-url https://rag.example.com/presign \
//!     --query-url https://rag.example.com/query
//! askcorp upload handbook.pdf
//! askcorp docs
//! askcorp ask "How many vacation days do new hires get?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`storage`] | Key-value persistence |
//! | [`models`] | Core data types |
//! | [`settings`] | Endpoint and model settings, model badge |
//! | [`registry`] | Document registry |
//! | [`client`] | HTTP calls to the external services |
//! | [`answer`] | Query response decoding |
//! | [`upload`] | Upload pipeline |
//! | [`chat`] | Chat pipeline and transcript |
//! | [`render`] | HTML and terminal rendering |
//! | [`notify`] | Toast notifications |
//! | [`progress`] | Upload progress indicator |
//! | [`app`] | Application controller |
//! | [`error`] | User-facing pipeline errors |

pub mod answer;
pub mod app;
pub mod chat;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod migrate;
pub mod models;
pub mod notify;
pub mod progress;
pub mod registry;
pub mod render;
pub mod settings;
pub mod storage;
pub mod upload;
