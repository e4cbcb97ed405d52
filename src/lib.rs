//! # Designer Chat
//!
//! A chat-driven form configuration editor service.
//!
//! A client sends a natural-language instruction and a `formId`. The
//! service looks up the form's stored configuration, strips null-valued
//! fields, hands both to a language model and returns the model's raw
//! answer (by convention `{"response": "...", "form": {...}}`).
//!
//! ## Architecture
//!
//! ```text
//!  request ──▶ ┌────────────┐   ┌───────────┐   ┌────────┐   ┌────────────┐
//!              │ OriginGate │──▶│ FormStore │──▶│ prune  │──▶│ Generator  │──▶ raw text
//!              │ (404 if no)│   │  .read()  │   │ nulls  │   │ (OpenAI)   │
//!              └────────────┘   └───────────┘   └────────┘   └────────────┘
//!                                 failure → {}                failure → 500
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! designer-chat init      # create database and collection
//! designer-chat get f1    # show a stored form as the model sees it
//! designer-chat serve     # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`store`] | Form store trait, SQLite and in-memory backends |
//! | [`prune`] | Null pruning of configuration documents |
//! | [`origin`] | Origin allow-list gate and CORS |
//! | [`generation`] | Text-completion provider abstraction |
//! | [`prompt`] | System instruction template |
//! | [`chat`] | Chat orchestration pipeline |
//! | [`server`] | HTTP server |
//! | [`db`] | Database connection |

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod generation;
pub mod get;
pub mod origin;
pub mod prompt;
pub mod provision;
pub mod prune;
pub mod server;
pub mod store;
