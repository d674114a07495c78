//! kill-switch: toggle the email recovery module kill switch.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dkim_admin::{init_tracing, print_submitted, report_failure, report_outcome, KillSwitchArgs};
use dkim_authorization::{
    ChainClient, CommandOutcome, DispatchError, LocalMessageSigner, RegistryCommandDispatcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = KillSwitchArgs::parse();
    init_tracing();

    match run(args).await {
        Ok(outcome) => report_outcome(&outcome),
        Err(e) => report_failure(&e),
    }
}

async fn run(args: KillSwitchArgs) -> Result<CommandOutcome> {
    let command = args.input().validate().map_err(DispatchError::from)?;

    let client = ChainClient::connect(args.network.chain_config())
        .await
        .map_err(DispatchError::from)
        .context("failed to connect to chain")?;

    info!(module = %format!("{:#x}", command.module), "Toggling kill switch");

    let dispatcher = RegistryCommandDispatcher::new(LocalMessageSigner::new(), client)
        .on_submitted(print_submitted);
    Ok(dispatcher.run_kill_switch(&command).await?)
}
