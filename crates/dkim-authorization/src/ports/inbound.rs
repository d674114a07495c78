//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;

use crate::domain::entities::CommandOutcome;
use crate::domain::errors::DispatchError;
use crate::domain::input::{KillSwitchInput, RegistryCommandInput};

/// Entry point for both administrative commands.
///
/// Each call is one linear flow. Validation happens before any signing or
/// network activity, and no step is retried.
#[async_trait]
pub trait RegistryCommandApi: Send + Sync {
    /// Validate, sign and submit a `set` or `revoke` authorization, then await
    /// its receipt.
    async fn dispatch_registry(
        &self,
        input: &RegistryCommandInput,
    ) -> Result<CommandOutcome, DispatchError>;

    /// Validate and submit a zero-argument `toggleKillSwitch()` call, then
    /// await its receipt. The toggle is blind: no on-chain state is read.
    async fn dispatch_kill_switch(
        &self,
        input: &KillSwitchInput,
    ) -> Result<CommandOutcome, DispatchError>;
}
