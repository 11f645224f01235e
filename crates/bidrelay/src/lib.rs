//! bidrelay - webhook relay for bid-document submissions
//!
//! This crate provides the relay server that forwards console submissions
//! (PDF uploads plus a prompt) to a workflow-automation webhook and hands the
//! reply back buffered or streamed, together with the wire contract shared
//! with console clients.

pub mod config;
pub mod contract;
pub mod error;
pub mod relay;

pub use error::BidrelayError;
