// rowkv-common - Shared types and client capability definitions for rowkv
//
// This crate defines the row/cell data model, request shapes, the
// `TableClient` seam the accessor talks through, and process configuration.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod scope;
pub mod types;

// Re-export for convenience
pub use client::*;
pub use config::*;
pub use error::*;
pub use protocol::*;
pub use scope::*;
pub use types::*;
