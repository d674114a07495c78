//! # JSON-RPC Chain Client
//!
//! Relayer side of the dispatch: builds, signs and sends a legacy EIP-155
//! transaction for a [`ContractCall`], then polls for its receipt.
//!
//! ```text
//! call():  address(key) → encode → nonce(pending) → gasPrice → estimateGas → sign → sendRaw
//! wait():  getTransactionReceipt every poll_interval until mined or timeout
//! ```
//!
//! Nothing here retries. A failed RPC call ends the operation.

use async_trait::async_trait;
use primitive_types::U256;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::rpc::{parse_hex_u64, CallRequest, RpcClient, RpcReceipt};
use crate::config::ChainConfig;
use crate::domain::abi;
use crate::domain::ecdsa::PrivateKey;
use crate::domain::entities::{
    to_hex, ContractCall, Hash, TransactionHandle, TransactionReceipt,
};
use crate::domain::errors::{ChainError, ReceiptError, SigningError};
use crate::domain::transaction::LegacyTransaction;
use crate::ports::outbound::TransactionSender;

/// Relayer bound to one endpoint and one chain id.
pub struct ChainClient {
    rpc: RpcClient,
    config: ChainConfig,
}

impl ChainClient {
    /// Open a client and confirm the endpoint serves `config.chain_id`.
    ///
    /// # Errors
    /// * `ChainError::InvalidConfig` - configuration failed validation
    /// * `ChainError::ChainIdMismatch` - endpoint reports another chain
    /// * `ChainError::Connection` - endpoint unreachable
    pub async fn connect(config: ChainConfig) -> Result<Self, ChainError> {
        config.validate()?;

        let rpc = RpcClient::new(config.rpc_url.clone(), config.request_timeout)?;
        let actual = rpc.chain_id().await?;
        if actual != config.chain_id {
            return Err(ChainError::ChainIdMismatch {
                expected: config.chain_id,
                actual,
            });
        }

        info!(
            network = %config.network_name,
            rpc_url = %config.rpc_url,
            chain_id = actual,
            "Connected to chain"
        );

        Ok(Self { rpc, config })
    }

    async fn gas_limit(&self, request: &CallRequest) -> Result<u64, ChainError> {
        match self.config.gas_limit {
            Some(gas) => Ok(gas),
            None => self.rpc.estimate_gas(request).await,
        }
    }
}

#[async_trait]
impl TransactionSender for ChainClient {
    async fn call(
        &self,
        call: &ContractCall,
        sender_key: &PrivateKey,
    ) -> Result<TransactionHandle, ChainError> {
        let from = sender_key
            .address()
            .map_err(|_| ChainError::InvalidRelayerKey)?;
        let data = abi::encode_call(&call.fragment, &call.args)?;

        let nonce = self.rpc.pending_nonce(from).await?;
        let gas_price = self.rpc.gas_price().await?;
        let gas_limit = self
            .gas_limit(&CallRequest {
                from: to_hex(from.as_bytes()),
                to: to_hex(call.contract.as_bytes()),
                data: to_hex(&data),
            })
            .await?;

        debug!(
            from = %format!("{from:#x}"),
            nonce,
            %gas_price,
            gas_limit,
            "Prepared transaction"
        );

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: call.contract,
            value: U256::zero(),
            data,
            chain_id: self.config.chain_id,
        };
        let signed = tx.sign(sender_key).map_err(|e| match e {
            SigningError::InvalidPrivateKey => ChainError::InvalidRelayerKey,
            other => ChainError::TransactionSigning(other.to_string()),
        })?;

        let hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        if hash != signed.hash {
            warn!(
                node = %format!("{hash:#x}"),
                local = %format!("{:#x}", signed.hash),
                "Node reported a different transaction hash"
            );
        }

        info!(
            tx_hash = %format!("{hash:#x}"),
            to = %format!("{:#x}", call.contract),
            nonce,
            "Transaction submitted"
        );

        Ok(TransactionHandle { hash, from, nonce })
    }

    async fn wait_for_receipt(
        &self,
        handle: &TransactionHandle,
    ) -> Result<TransactionReceipt, ReceiptError> {
        let tx_hash = handle.hash;
        let started = Instant::now();

        loop {
            let receipt = self
                .rpc
                .transaction_receipt(tx_hash)
                .await
                .map_err(|source| ReceiptError::Provider { tx_hash, source })?;

            if let Some(receipt) = receipt {
                if let Some(mined) = interpret_receipt(tx_hash, &receipt)? {
                    info!(
                        tx_hash = %format!("{tx_hash:#x}"),
                        block = mined.block_number,
                        "Transaction mined"
                    );
                    return Ok(mined);
                }
            }

            let waited = started.elapsed();
            if let Some(limit) = self.config.receipt_timeout {
                if waited >= limit {
                    return Err(ReceiptError::NotFound { tx_hash, waited });
                }
            }

            debug!(tx_hash = %format!("{tx_hash:#x}"), ?waited, "Receipt pending");
            sleep(self.config.receipt_poll_interval).await;
        }
    }
}

/// Turn a raw receipt into a mined result. `Ok(None)` while it has no block.
fn interpret_receipt(
    tx_hash: Hash,
    receipt: &RpcReceipt,
) -> Result<Option<TransactionReceipt>, ReceiptError> {
    let parse = |value: &str| {
        parse_hex_u64(value).map_err(|source| ReceiptError::Provider { tx_hash, source })
    };

    let Some(block) = receipt.block_number.as_deref() else {
        return Ok(None);
    };
    let block_number = parse(block)?;

    // Pre-Byzantium receipts carry no status; treat them as successful.
    if let Some(status) = receipt.status.as_deref() {
        if parse(status)? == 0 {
            return Err(ReceiptError::Reverted {
                tx_hash,
                block_number,
            });
        }
    }

    let gas_used = receipt.gas_used.as_deref().map(parse).transpose()?;

    Ok(Some(TransactionReceipt {
        transaction_hash: tx_hash,
        block_number,
        gas_used,
    }))
}
