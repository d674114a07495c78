//! # Error Taxonomy
//!
//! One enum per failure class. None of them is retried; every failure ends
//! the dispatch and is reported to the operator.
//!
//! | Class | Raised | Chain side effects |
//! |-------|--------|--------------------|
//! | `ValidationError` | before signing or any network call | none |
//! | `SigningError` | while signing the canonical message | none |
//! | `ChainError` | connecting, encoding, estimating, sending | gas may be spent on a send-time revert |
//! | `ReceiptError` | while awaiting inclusion | the transaction may still land |

use std::time::Duration;

use thiserror::Error;

use super::entities::Hash;

/// Missing or malformed command input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required options were not supplied
    #[error("missing required option(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// `--command` is neither `set` nor `revoke`
    #[error("unknown command '{0}', expected 'set' or 'revoke'")]
    UnknownCommand(String),

    /// Address is not 20 bytes of hex
    #[error("invalid address for {field}: {reason}")]
    InvalidAddress { field: &'static str, reason: String },

    /// Hash is not 32 bytes of hex
    #[error("invalid 32-byte hex value for {field}: {reason}")]
    InvalidHash { field: &'static str, reason: String },

    /// Private key is not 32 bytes of hex
    #[error("invalid private key for {field}: expected 32 bytes of hex")]
    InvalidPrivateKey { field: &'static str },
}

/// Failure while producing the authorizer signature.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Key bytes are not a valid secp256k1 scalar
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidPrivateKey,

    /// The curve operation itself failed
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Recovery ID (v must be 0, 1, 27, or 28)
    #[error("invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Signature bytes could not be parsed or recovered
    #[error("failed to recover signer from signature")]
    RecoveryFailed,
}

/// Failure while encoding a call against a minimal ABI fragment.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("malformed function fragment: {0}")]
    InvalidFragment(String),

    #[error("unsupported ABI type: {0}")]
    UnsupportedType(String),

    #[error("argument count mismatch: fragment takes {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {index} does not match parameter type {expected}")]
    TypeMismatch { index: usize, expected: String },

    #[error("bytes{size} argument has {actual} bytes")]
    FixedBytesLength { size: usize, actual: usize },
}

/// Failure on the submission side of the chain client.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("chain id mismatch: configured {expected}, endpoint reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("relayer private key is not a valid secp256k1 scalar")]
    InvalidRelayerKey,

    #[error("transaction signing failed: {0}")]
    TransactionSigning(String),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error("invalid chain configuration: {0}")]
    InvalidConfig(String),
}

/// Failure while awaiting inclusion of a submitted transaction.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Mined with status 0
    #[error("transaction {tx_hash:#x} reverted in block {block_number}")]
    Reverted { tx_hash: Hash, block_number: u64 },

    /// No receipt within the configured wait
    #[error("transaction {tx_hash:#x} receipt not found after {waited:?}")]
    NotFound { tx_hash: Hash, waited: Duration },

    /// The provider failed while polling
    #[error("provider error while awaiting {tx_hash:#x}: {source}")]
    Provider {
        tx_hash: Hash,
        #[source]
        source: ChainError,
    },
}

impl ReceiptError {
    pub fn transaction_hash(&self) -> Hash {
        match self {
            ReceiptError::Reverted { tx_hash, .. }
            | ReceiptError::NotFound { tx_hash, .. }
            | ReceiptError::Provider { tx_hash, .. } => *tx_hash,
        }
    }
}

/// Terminal failure of a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("submission error: {0}")]
    Submission(#[from] ChainError),

    #[error("receipt error: {0}")]
    Receipt(#[from] ReceiptError),
}

impl DispatchError {
    /// Short class name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "validation",
            DispatchError::Signing(_) => "signing",
            DispatchError::Submission(_) => "submission",
            DispatchError::Receipt(_) => "receipt",
        }
    }

    /// Hash of the submitted transaction, once one exists.
    pub fn transaction_hash(&self) -> Option<Hash> {
        match self {
            DispatchError::Receipt(e) => Some(e.transaction_hash()),
            _ => None,
        }
    }
}
