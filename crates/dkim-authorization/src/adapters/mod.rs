//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.
//! - `signer`: in-process EIP-191 signer with an ephemeral key
//! - `rpc`: JSON-RPC 2.0 over HTTP
//! - `chain`: relayer wallet bound to one endpoint and chain id

pub mod chain;
pub mod rpc;
pub mod signer;
