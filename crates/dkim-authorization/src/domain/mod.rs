//! # Domain Layer
//!
//! Pure logic with no I/O: canonical messages, secp256k1 signing, ABI and
//! transaction encoding, input validation and the dispatch state machine.

pub mod abi;
pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod input;
pub mod message;
pub mod state;
pub mod transaction;
