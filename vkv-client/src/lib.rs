//! # vkv Client
//!
//! Purpose: Provide typed, synchronous helpers over a Valkey/Redis
//! connection, where reading an absent key or field yields the zero value
//! of its type instead of an error.
//!
//! ## Design Principles
//! 1. **Thin Adapter**: Wire protocol, cluster routing and TLS belong to the
//!    `redis` crate; this crate only builds commands and shapes replies.
//! 2. **One Call, One Command**: No retries, caching or batching.
//! 3. **Per-Instance Context**: Cancellation and deadlines never leak between
//!    clients.

mod client;
mod command;
mod config;
mod context;
mod error;
mod reply;

pub use client::Client;
pub use config::{ClientConfig, ClientConfigBuilder, TlsConfig};
pub use context::Context;
pub use error::{ConnectionError, ConnectionResult, OperationError, OperationResult};
