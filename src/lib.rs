//! Merge Ledger - records pull requests merged to trunk, enriched with the
//! changed dbt models and an AI-generated summary.
//!
//! This library provides the event processor and its collaborators; the
//! binary wires them to a webhook server or the replay command.

pub mod archive;
pub mod config;
pub mod github;
pub mod processor;
pub mod replay;
pub mod server;
pub mod store;
pub mod summarizer;
pub mod types;
pub mod webhooks;
