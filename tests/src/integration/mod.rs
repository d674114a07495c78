//! Cross-component flows: the real `ChainClient` talking JSON-RPC over HTTP.

pub mod fake_node;
mod flows;
