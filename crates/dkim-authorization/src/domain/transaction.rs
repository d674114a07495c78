//! # Legacy Transactions (EIP-155)
//!
//! The relayer's transaction is a legacy, replay-protected transaction:
//!
//! ```text
//! signing hash = keccak256(rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]))
//! raw          = rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])
//! v            = recovery_id + 35 + 2 * chainId
//! ```

use primitive_types::U256;
use rlp::RlpStream;

use super::ecdsa::{keccak256, sign_prehash, PrivateKey, RecoverableSignature};
use super::entities::{Address, Hash};
use super::errors::SigningError;

/// Unsigned legacy transaction calling a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// Signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub raw: Vec<u8>,
    pub hash: Hash,
}

impl LegacyTransaction {
    fn append_payload(&self, stream: &mut RlpStream) {
        stream.append(&self.nonce);
        stream.append(&self.gas_price);
        stream.append(&self.gas_limit);
        stream.append(&self.to);
        stream.append(&self.value);
        stream.append(&self.data);
    }

    /// EIP-155 signing hash.
    pub fn signing_hash(&self) -> [u8; 32] {
        let mut stream = RlpStream::new_list(9);
        self.append_payload(&mut stream);
        stream.append(&self.chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        keccak256(stream.as_raw())
    }

    /// Encode with an existing signature whose `v` is the raw recovery id.
    pub fn encode_signed(
        &self,
        signature: &RecoverableSignature,
    ) -> Result<SignedTransaction, SigningError> {
        let v = self
            .chain_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(35 + u64::from(signature.v)))
            .ok_or_else(|| {
                SigningError::SigningFailed(format!(
                    "chain id {} does not fit an EIP-155 v value",
                    self.chain_id
                ))
            })?;

        let mut stream = RlpStream::new_list(9);
        self.append_payload(&mut stream);
        stream.append(&v);
        stream.append(&U256::from_big_endian(&signature.r));
        stream.append(&U256::from_big_endian(&signature.s));

        let raw = stream.out().to_vec();
        let hash = Hash::from(keccak256(&raw));
        Ok(SignedTransaction { raw, hash })
    }

    /// Sign with the relayer key.
    pub fn sign(&self, key: &PrivateKey) -> Result<SignedTransaction, SigningError> {
        let signature = sign_prehash(key, &self.signing_hash())?;
        self.encode_signed(&signature)
    }
}
