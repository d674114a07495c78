//! # ECDSA Signing and Recovery (secp256k1)
//!
//! Ethereum-compatible signing for both identities in a dispatch:
//!
//! - the authorizer signs the canonical message as an EIP-191 personal message
//! - the relayer signs the transaction signing hash (EIP-155)
//!
//! ## Security Notes
//!
//! - RFC 6979 deterministic nonces, low-S normalization (EIP-2)
//! - Key bytes live in [`PrivateKey`], zeroized on drop and redacted in `Debug`
//! - A `SigningKey` is only ever constructed inside a single signing call

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::entities::Address;
use super::errors::SigningError;

/// Prefix applied by `eth_sign` / `personal_sign` before hashing.
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Offset added to the recovery id in personal-message signatures.
const PERSONAL_V_OFFSET: u8 = 27;

// =============================================================================
// PRIVATE KEY
// =============================================================================

/// Raw secp256k1 secret, zeroized on drop.
///
/// Only the hex form is checked at parse time. Whether the scalar is usable on
/// the curve is discovered when a signing call first builds a `SigningKey`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Create from raw secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hex digits, with or without `0x`.
    pub fn from_hex(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let mut bytes = [0u8; 32];
        match hex::decode_to_slice(digits, &mut bytes) {
            Ok(()) => Some(Self(bytes)),
            Err(_) => {
                bytes.zeroize();
                None
            }
        }
    }

    pub(crate) fn signing_key(&self) -> Result<SigningKey, SigningError> {
        SigningKey::from_bytes((&self.0).into()).map_err(|_| SigningError::InvalidPrivateKey)
    }

    /// Ethereum address controlled by this key.
    pub fn address(&self) -> Result<Address, SigningError> {
        let signing_key = self.signing_key()?;
        Ok(address_from_pubkey(signing_key.verifying_key()))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// A 65-byte `r || s || v` signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery id, either raw (0/1) or personal-message form (27/28).
    pub v: u8,
}

impl RecoverableSignature {
    /// Serialize as `r || s || v`.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Parse `r || s || v`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != 65 {
            return Err(SigningError::RecoveryFailed);
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    /// Normalized recovery id (0 or 1).
    pub fn recovery_id(&self) -> Result<RecoveryId, SigningError> {
        parse_recovery_id(self.v)
    }
}

/// Parse recovery ID from v value.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SigningError> {
    let normalized = match v {
        0 | 1 => v,
        27 | 28 => v - PERSONAL_V_OFFSET,
        _ => return Err(SigningError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(normalized).ok_or(SigningError::InvalidRecoveryId(v))
}

// =============================================================================
// HASHING
// =============================================================================

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// EIP-191 personal-message hash.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    // Take last 20 bytes as address
    Address::from_slice(&hash[12..])
}

// =============================================================================
// SIGN / RECOVER
// =============================================================================

/// Sign a 32-byte digest. Returns a signature with a raw (0/1) recovery id.
pub fn sign_prehash(key: &PrivateKey, prehash: &[u8; 32]) -> Result<RecoverableSignature, SigningError> {
    let signing_key = key.signing_key()?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(prehash)
        .map_err(|e| SigningError::SigningFailed(e.to_string()))?;

    let bytes: [u8; 64] = signature.to_bytes().into();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(RecoverableSignature {
        r,
        s,
        v: recovery_id.to_byte(),
    })
}

/// Sign a message as an EIP-191 personal message (`v` is 27 or 28).
pub fn sign_message(key: &PrivateKey, message: &[u8]) -> Result<RecoverableSignature, SigningError> {
    let mut signature = sign_prehash(key, &hash_message(message))?;
    signature.v += PERSONAL_V_OFFSET;
    Ok(signature)
}

/// Recover the signer's address from a digest and signature.
pub fn recover_prehash(
    prehash: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<Address, SigningError> {
    let recovery_id = signature.recovery_id()?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| SigningError::RecoveryFailed)?;

    let recovered_key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|_| SigningError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Recover the signer of an EIP-191 personal message.
pub fn recover_message_signer(
    message: &[u8],
    signature: &RecoverableSignature,
) -> Result<Address, SigningError> {
    recover_prehash(&hash_message(message), signature)
}
