//! # DKIM Registry Authorization
//!
//! Split authorization for privileged registry and recovery-module calls.
//!
//! An *authorizer* signs a canonical status message with an EIP-191 personal
//! signature. A *relayer* submits that signature on-chain and pays gas without
//! ever holding the authorizer key. Only the address recoverable from the
//! signature carries authorization weight on-chain.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Message canonicalization, signing, ABI and
//!   transaction encoding, input validation, the dispatch state machine
//! - **Ports Layer** (`ports/`): `MessageSigner` and `TransactionSender`
//!   capabilities, plus the inbound `RegistryCommandApi`
//! - **Adapters Layer** (`adapters/`): Local ephemeral signer, JSON-RPC chain client
//! - **Service Layer** (`service.rs`): The command dispatcher
//!
//! ## Flow
//!
//! ```text
//! Idle ──validate──→ MessageBuilt ──sign──→ Signed ──send──→ Submitted ─┬→ Mined
//!   │                                                          ↑       └→ Failed
//!   └───────────────────── kill switch (no message) ───────────┘
//! ```
//!
//! No step is retried. Every failure is surfaced to the operator.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::chain::ChainClient;
pub use adapters::signer::LocalMessageSigner;
pub use config::ChainConfig;
pub use domain::entities::{
    Address, AuthorizationAction, AuthorizationRequest, CanonicalMessage, CommandOutcome,
    ContractCall, DomainRecord, Hash, SignedAuthorization, TransactionHandle, TransactionReceipt,
};
pub use domain::errors::{
    AbiError, ChainError, DispatchError, ReceiptError, SigningError, ValidationError,
};
pub use domain::input::{KillSwitchCommand, KillSwitchInput, RegistryCommand, RegistryCommandInput};
pub use domain::state::DispatchState;
pub use ports::inbound::RegistryCommandApi;
pub use ports::outbound::{MessageSigner, TransactionSender};
pub use service::RegistryCommandDispatcher;
