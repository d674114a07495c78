//! # Registry Command Dispatcher
//!
//! Application service implementing [`RegistryCommandApi`].
//!
//! ## Architecture
//!
//! The dispatcher owns the flow and the state machine only:
//! - Validation and message building are delegated to the domain layer
//! - Signing goes through the `MessageSigner` port (authorizer)
//! - Submission and receipt polling go through the `TransactionSender` port (relayer)

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::ecdsa::PrivateKey;
use crate::domain::entities::{CommandOutcome, ContractCall, TransactionHandle, TransactionReceipt};
use crate::domain::errors::DispatchError;
use crate::domain::input::{KillSwitchCommand, KillSwitchInput, RegistryCommand, RegistryCommandInput};
use crate::domain::message;
use crate::domain::state::DispatchState;
use crate::ports::inbound::RegistryCommandApi;
use crate::ports::outbound::{MessageSigner, TransactionSender};

/// Tracks one dispatch through [`DispatchState`].
struct Progress {
    command: &'static str,
    state: DispatchState,
}

impl Progress {
    fn start(command: &'static str) -> Self {
        Self {
            command,
            state: DispatchState::Idle,
        }
    }

    fn advance(&mut self, next: DispatchState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(command = self.command, from = %self.state, to = %next, "State transition");
        self.state = next;
    }
}

/// Called once a transaction has been accepted by the node.
type SubmissionHook = Box<dyn Fn(&TransactionHandle) + Send + Sync>;

/// Drives `set`, `revoke` and kill switch commands to completion.
pub struct RegistryCommandDispatcher<S: MessageSigner, T: TransactionSender> {
    signer: S,
    sender: T,
    on_submitted: Option<SubmissionHook>,
}

impl<S: MessageSigner, T: TransactionSender> RegistryCommandDispatcher<S, T> {
    /// # Arguments
    /// * `signer` - Authorizer capability
    /// * `sender` - Relayer capability
    pub fn new(signer: S, sender: T) -> Self {
        Self {
            signer,
            sender,
            on_submitted: None,
        }
    }

    /// Run `hook` as soon as a transaction is submitted, before its receipt
    /// is awaited.
    pub fn on_submitted<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransactionHandle) + Send + Sync + 'static,
    {
        self.on_submitted = Some(Box::new(hook));
        self
    }

    pub fn sender(&self) -> &T {
        &self.sender
    }

    /// Run a validated `set` or `revoke` command.
    pub async fn run_registry(
        &self,
        command: &RegistryCommand,
    ) -> Result<CommandOutcome, DispatchError> {
        let request = &command.request;
        let mut progress = Progress::start(request.action.name());

        if message::has_delimiters(&request.record.domain_name) {
            warn!(
                domain = %request.record.domain_name,
                "Domain contains ';' or '=', the signed message will be ambiguous"
            );
        }

        let msg = request.canonical_message();
        progress.advance(DispatchState::MessageBuilt);
        info!(message = %msg, "Built canonical message");

        let signed = self.signer.sign(&msg, &command.authorizer_key).await?;
        progress.advance(DispatchState::Signed);

        if signed.signer != request.authorizer {
            warn!(
                signer = %format!("{:#x}", signed.signer),
                authorizer = %format!("{:#x}", request.authorizer),
                "Signing key does not belong to the declared authorizer, the registry will reject it"
            );
        }

        let call = ContractCall::registry(command.registry, request, &signed);
        let handle = self.submit(&call, &command.sender_key, &mut progress).await?;

        let receipt = self.await_receipt(&handle, &mut progress).await?;

        Ok(CommandOutcome {
            message: Some(msg),
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            final_state: progress.state,
        })
    }

    /// Run a validated kill switch toggle.
    pub async fn run_kill_switch(
        &self,
        command: &KillSwitchCommand,
    ) -> Result<CommandOutcome, DispatchError> {
        let mut progress = Progress::start("kill-switch");
        let call = ContractCall::kill_switch(command.module);

        let handle = self.submit(&call, &command.sender_key, &mut progress).await?;

        let receipt = self.await_receipt(&handle, &mut progress).await?;

        Ok(CommandOutcome {
            message: None,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            final_state: progress.state,
        })
    }

    async fn submit(
        &self,
        call: &ContractCall,
        sender_key: &PrivateKey,
        progress: &mut Progress,
    ) -> Result<TransactionHandle, DispatchError> {
        let handle = self.sender.call(call, sender_key).await?;
        progress.advance(DispatchState::Submitted);
        if let Some(hook) = &self.on_submitted {
            hook(&handle);
        }
        Ok(handle)
    }

    async fn await_receipt(
        &self,
        handle: &TransactionHandle,
        progress: &mut Progress,
    ) -> Result<TransactionReceipt, DispatchError> {
        match self.sender.wait_for_receipt(handle).await {
            Ok(receipt) => {
                progress.advance(DispatchState::Mined);
                Ok(receipt)
            }
            Err(e) => {
                progress.advance(DispatchState::Failed);
                error!(
                    command = progress.command,
                    tx_hash = %format!("{:#x}", e.transaction_hash()),
                    error = %e,
                    "Transaction failed after submission"
                );
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<S: MessageSigner, T: TransactionSender> RegistryCommandApi
    for RegistryCommandDispatcher<S, T>
{
    async fn dispatch_registry(
        &self,
        input: &RegistryCommandInput,
    ) -> Result<CommandOutcome, DispatchError> {
        let command = input.validate()?;
        self.run_registry(&command).await
    }

    async fn dispatch_kill_switch(
        &self,
        input: &KillSwitchInput,
    ) -> Result<CommandOutcome, DispatchError> {
        let command = input.validate()?;
        self.run_kill_switch(&command).await
    }
}
