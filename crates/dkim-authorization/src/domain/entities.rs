//! # Domain Entities
//!
//! Values that flow through one dispatch. All of them are built once from
//! validated input and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use super::abi::Token;
use super::ecdsa::RecoverableSignature;
use super::errors::ValidationError;
use super::message;
use super::state::DispatchState;

pub use primitive_types::{H160 as Address, H256 as Hash};

/// `0x`-prefixed lowercase hex of arbitrary bytes.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// =============================================================================
// AUTHORIZATION ACTION
// =============================================================================

/// Registry operation an authorizer can approve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationAction {
    /// Register a public-key hash for a domain.
    Set,
    /// Revoke a public-key hash for a domain.
    Revoke,
}

impl AuthorizationAction {
    /// Literal prefix of the canonical message.
    pub fn prefix(&self) -> &'static str {
        match self {
            AuthorizationAction::Set => "SET:",
            AuthorizationAction::Revoke => "REVOKE:",
        }
    }

    /// Command name as typed by the operator.
    pub fn name(&self) -> &'static str {
        match self {
            AuthorizationAction::Set => "set",
            AuthorizationAction::Revoke => "revoke",
        }
    }

    /// Registry function invoked for this action.
    pub fn function_fragment(&self) -> &'static str {
        match self {
            AuthorizationAction::Set => SET_DKIM_PUBLIC_KEY_HASH,
            AuthorizationAction::Revoke => REVOKE_DKIM_PUBLIC_KEY_HASH,
        }
    }
}

impl fmt::Display for AuthorizationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AuthorizationAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "set" => Ok(AuthorizationAction::Set),
            "revoke" => Ok(AuthorizationAction::Revoke),
            _ => Err(ValidationError::UnknownCommand(s.to_string())),
        }
    }
}

/// `UserOverridableDKIMRegistry.setDKIMPublicKeyHash`
pub const SET_DKIM_PUBLIC_KEY_HASH: &str = "function setDKIMPublicKeyHash(string domainName, bytes32 publicKeyHash, address authorizer, bytes signature)";

/// `UserOverridableDKIMRegistry.revokeDKIMPublicKeyHash`
pub const REVOKE_DKIM_PUBLIC_KEY_HASH: &str = "function revokeDKIMPublicKeyHash(string domainName, bytes32 publicKeyHash, address authorizer, bytes signature)";

/// `EmailRecoveryManager.toggleKillSwitch`
pub const TOGGLE_KILL_SWITCH: &str = "function toggleKillSwitch()";

// =============================================================================
// REQUEST VALUES
// =============================================================================

/// A DKIM key entry.
///
/// The domain name is not validated here; that is the registry contract's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub domain_name: String,
    pub public_key_hash: Hash,
}

/// One authorization, built per invocation and consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub action: AuthorizationAction,
    pub record: DomainRecord,
    pub authorizer: Address,
}

impl AuthorizationRequest {
    /// Derive the message the authorizer must sign.
    pub fn canonical_message(&self) -> CanonicalMessage {
        message::build(
            self.action,
            &self.record.domain_name,
            &self.record.public_key_hash,
        )
    }
}

/// Exact string both the signer and the on-chain verifier derive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalMessage(String);

impl CanonicalMessage {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for CanonicalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of the authorization signer. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization {
    pub message: CanonicalMessage,
    pub signature: RecoverableSignature,
    /// Address recovered from `(message, signature)`.
    pub signer: Address,
}

// =============================================================================
// CHAIN VALUES
// =============================================================================

/// A contract method invocation, described by a minimal ABI fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub contract: Address,
    pub fragment: String,
    pub args: Vec<Token>,
}

impl ContractCall {
    pub fn new(contract: Address, fragment: impl Into<String>, args: Vec<Token>) -> Self {
        Self {
            contract,
            fragment: fragment.into(),
            args,
        }
    }

    /// Registry call for a signed set/revoke authorization.
    pub fn registry(
        registry: Address,
        request: &AuthorizationRequest,
        signed: &SignedAuthorization,
    ) -> Self {
        Self::new(
            registry,
            request.action.function_fragment(),
            vec![
                Token::String(request.record.domain_name.clone()),
                Token::FixedBytes(request.record.public_key_hash.as_bytes().to_vec()),
                Token::Address(request.authorizer),
                Token::Bytes(signed.signature.to_bytes().to_vec()),
            ],
        )
    }

    /// Zero-argument kill switch toggle.
    pub fn kill_switch(module: Address) -> Self {
        Self::new(module, TOGGLE_KILL_SWITCH, Vec::new())
    }
}

/// A submitted transaction, not yet known to be mined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionHandle {
    pub hash: Hash,
    pub from: Address,
    pub nonce: u64,
}

/// Receipt of a mined, successful transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: Hash,
    pub block_number: u64,
    pub gas_used: Option<u64>,
}

/// Result of a dispatch that reached `Mined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Signed message, absent for the kill switch.
    pub message: Option<CanonicalMessage>,
    pub transaction_hash: Hash,
    pub block_number: u64,
    pub final_state: DispatchState,
}
