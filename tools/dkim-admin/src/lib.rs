//! Shared pieces of the `dkim-registry` and `kill-switch` binaries.
//!
//! Every command option is optional at the clap layer. Missing options are
//! reported by the library's validation, all at once, before anything is
//! signed or sent.

use std::process::ExitCode;

use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use dkim_authorization::{
    ChainConfig, CommandOutcome, KillSwitchInput, RegistryCommandInput, TransactionHandle,
};

const REGISTRY_EXAMPLE: &str = "\
Example:
  dkim-registry --command set \\
    --private-key 0x3d3cbc973389cb26f657686445bcc75662b415b656078503592ac8c1abb8810e \\
    --authorizer-private-key 0x509ca2e9e6acf0ba086477910950125e698d4ea70fa6f63e000c5a22bda9361c \\
    --authorizer 0x55bE1B079b53962746B2e86d12f158a41DF294A6 \\
    --registry-address 0x037d80f98aE461DC307F16524EC0Fc53b2E9E0b1 \\
    --domain-name gmail.com \\
    --public-key-hash 0x0ea9c777dc7110e5a9e89b13f0cfc540e3845ba120b2b6dc24024d61488d4788";

const KILL_SWITCH_EXAMPLE: &str = "\
Example:
  kill-switch \\
    --private-key 0x3d3cbc973389cb26f657686445bcc75662b415b656078503592ac8c1abb8810e \\
    --module-address 0x037d80f98aE461DC307F16524EC0Fc53b2E9E0b1";

/// Endpoint overrides. Flags win over `DKIM_*` environment variables.
#[derive(Args, Clone, Default)]
pub struct NetworkArgs {
    /// JSON-RPC endpoint [default: https://sepolia.era.zksync.dev]
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Expected chain id [default: 300]
    #[arg(long)]
    pub chain_id: Option<u64>,
}

impl NetworkArgs {
    /// Environment configuration with flag overrides applied.
    pub fn chain_config(&self) -> ChainConfig {
        self.apply(ChainConfig::from_env())
    }

    pub fn apply(&self, mut config: ChainConfig) -> ChainConfig {
        if let Some(url) = &self.rpc_url {
            config = config.with_rpc_url(url.clone());
            config.network_name = "custom".to_string();
        }
        if let Some(chain_id) = self.chain_id {
            config = config.with_chain_id(chain_id);
        }
        config
    }
}

/// Set or revoke a DKIM public-key hash in the registry.
#[derive(Parser, Clone)]
#[command(
    name = "dkim-registry",
    version,
    about = "Sign and submit a DKIM public-key hash authorization",
    arg_required_else_help = true,
    after_help = REGISTRY_EXAMPLE
)]
pub struct RegistryArgs {
    /// Operation to authorize
    #[arg(long, value_name = "set|revoke")]
    pub command: Option<String>,

    /// Relayer key, pays gas
    #[arg(long, value_name = "HEX", env = "DKIM_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Authorizer key, signs the canonical message
    #[arg(
        long,
        value_name = "HEX",
        env = "DKIM_AUTHORIZER_PRIVATE_KEY",
        hide_env_values = true
    )]
    pub authorizer_private_key: Option<String>,

    /// Address the registry checks the signature against
    #[arg(long, value_name = "ADDRESS")]
    pub authorizer: Option<String>,

    /// UserOverridableDKIMRegistry contract
    #[arg(long, value_name = "ADDRESS")]
    pub registry_address: Option<String>,

    #[arg(long, value_name = "DOMAIN")]
    pub domain_name: Option<String>,

    /// 32-byte hash of the domain's DKIM public key
    #[arg(long, value_name = "HEX")]
    pub public_key_hash: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl RegistryArgs {
    pub fn input(&self) -> RegistryCommandInput {
        RegistryCommandInput {
            command: self.command.clone(),
            private_key: self.private_key.clone(),
            authorizer_private_key: self.authorizer_private_key.clone(),
            authorizer: self.authorizer.clone(),
            registry_address: self.registry_address.clone(),
            domain_name: self.domain_name.clone(),
            public_key_hash: self.public_key_hash.clone(),
        }
    }
}

/// Toggle the email recovery module kill switch.
#[derive(Parser, Clone)]
#[command(
    name = "kill-switch",
    version,
    about = "Toggle the email recovery module kill switch",
    long_about = "Sends toggleKillSwitch() to the module. The toggle is blind: \
                  the current on-chain value is not read first.",
    arg_required_else_help = true,
    after_help = KILL_SWITCH_EXAMPLE
)]
pub struct KillSwitchArgs {
    /// Relayer key, pays gas
    #[arg(long, value_name = "HEX", env = "DKIM_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Email recovery module contract
    #[arg(long, value_name = "ADDRESS")]
    pub module_address: Option<String>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

impl KillSwitchArgs {
    pub fn input(&self) -> KillSwitchInput {
        KillSwitchInput {
            private_key: self.private_key.clone(),
            module_address: self.module_address.clone(),
        }
    }
}

/// Log to stderr so stdout carries only results. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Printed as soon as the node accepts the transaction, so the hash is on
/// stdout even if the receipt wait later fails or is interrupted.
pub fn print_submitted(handle: &TransactionHandle) {
    println!("Transaction Hash: {:#x}", handle.hash);
}

pub fn report_outcome(outcome: &CommandOutcome) -> ExitCode {
    println!("Transaction was mined in block: {}", outcome.block_number);
    ExitCode::SUCCESS
}

pub fn report_failure(err: &anyhow::Error) -> ExitCode {
    eprintln!("Error: {err:#}");
    ExitCode::FAILURE
}
