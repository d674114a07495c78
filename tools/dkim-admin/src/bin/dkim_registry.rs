//! dkim-registry: authorize a DKIM public-key hash change and relay it on-chain.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dkim_admin::{init_tracing, print_submitted, report_failure, report_outcome, RegistryArgs};
use dkim_authorization::{
    ChainClient, CommandOutcome, DispatchError, LocalMessageSigner, RegistryCommandDispatcher,
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = RegistryArgs::parse();
    init_tracing();

    match run(args).await {
        Ok(outcome) => report_outcome(&outcome),
        Err(e) => report_failure(&e),
    }
}

async fn run(args: RegistryArgs) -> Result<CommandOutcome> {
    // Validate before touching the network.
    let command = args.input().validate().map_err(DispatchError::from)?;
    println!("Canonical message: {}", command.request.canonical_message());

    let config = args.network.chain_config();
    let client = ChainClient::connect(config)
        .await
        .map_err(DispatchError::from)
        .context("failed to connect to chain")?;

    info!(
        command = %command.request.action,
        domain = %command.request.record.domain_name,
        "Dispatching registry authorization"
    );

    let dispatcher = RegistryCommandDispatcher::new(LocalMessageSigner::new(), client)
        .on_submitted(print_submitted);
    Ok(dispatcher.run_registry(&command).await?)
}
