//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Parsing of `pull_request` payloads into [`InboundEvent`] values
//! - Signature verification for webhook payloads (HMAC-SHA256)

pub mod events;
pub mod parser;
pub mod signature;

pub use events::InboundEvent;
pub use parser::{ParseError, parse_pull_request_payload, parse_webhook};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
