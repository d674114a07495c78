//! # Outbound Ports (Driven Ports / SPI)
//!
//! The authorizer and the relayer are separate capabilities so either one
//! can be substituted on its own. The relayer never sees the authorizer key
//! and the signer never touches the network.

use async_trait::async_trait;

use crate::domain::ecdsa::PrivateKey;
use crate::domain::entities::{
    CanonicalMessage, ContractCall, SignedAuthorization, TransactionHandle, TransactionReceipt,
};
use crate::domain::errors::{ChainError, ReceiptError, SigningError};

/// Produces the authorizer's signature over a canonical message.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Sign `message` with `key`.
    ///
    /// # Errors
    /// * `SigningError::InvalidPrivateKey` - key is not a valid secp256k1 scalar
    async fn sign(
        &self,
        message: &CanonicalMessage,
        key: &PrivateKey,
    ) -> Result<SignedAuthorization, SigningError>;
}

/// Submits contract calls as the relayer and awaits their inclusion.
#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// Encode, sign and send `call`, paying gas from `sender_key`.
    ///
    /// Returns as soon as the node accepts the transaction.
    async fn call(
        &self,
        call: &ContractCall,
        sender_key: &PrivateKey,
    ) -> Result<TransactionHandle, ChainError>;

    /// Wait until `handle` is mined.
    ///
    /// # Errors
    /// * `ReceiptError::Reverted` - mined with status 0
    /// * `ReceiptError::NotFound` - no receipt within the configured wait
    /// * `ReceiptError::Provider` - transport failure while polling
    async fn wait_for_receipt(
        &self,
        handle: &TransactionHandle,
    ) -> Result<TransactionReceipt, ReceiptError>;
}
