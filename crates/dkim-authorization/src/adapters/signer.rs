//! Local authorizer signer.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ecdsa::{recover_message_signer, sign_message, PrivateKey};
use crate::domain::entities::{CanonicalMessage, SignedAuthorization};
use crate::domain::errors::SigningError;
use crate::ports::outbound::MessageSigner;

/// Signs in-process. Holds no key material between calls: a `SigningKey` is
/// built inside [`MessageSigner::sign`] and dropped (and zeroized) before it
/// returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMessageSigner;

impl LocalMessageSigner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSigner for LocalMessageSigner {
    async fn sign(
        &self,
        message: &CanonicalMessage,
        key: &PrivateKey,
    ) -> Result<SignedAuthorization, SigningError> {
        let signature = sign_message(key, message.as_bytes())?;
        let signer = recover_message_signer(message.as_bytes(), &signature)?;

        debug!(signer = %format!("{signer:#x}"), "Signed canonical message");

        Ok(SignedAuthorization {
            message: message.clone(),
            signature,
            signer,
        })
    }
}
