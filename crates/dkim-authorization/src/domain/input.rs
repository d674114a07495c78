//! # Command Input Validation
//!
//! Raw options arrive as optional strings. Validation either yields an
//! immutable command or a [`ValidationError`]; nothing is signed or sent for
//! partially valid input.

use super::ecdsa::PrivateKey;
use super::entities::{Address, AuthorizationAction, AuthorizationRequest, DomainRecord, Hash};
use super::errors::ValidationError;

/// Raw options of the `dkim-registry` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryCommandInput {
    pub command: Option<String>,
    pub private_key: Option<String>,
    pub authorizer_private_key: Option<String>,
    pub authorizer: Option<String>,
    pub registry_address: Option<String>,
    pub domain_name: Option<String>,
    pub public_key_hash: Option<String>,
}

/// Validated `dkim-registry` command.
#[derive(Debug, Clone)]
pub struct RegistryCommand {
    pub request: AuthorizationRequest,
    pub registry: Address,
    /// Relayer key, pays gas.
    pub sender_key: PrivateKey,
    /// Authorizer key, signs the canonical message.
    pub authorizer_key: PrivateKey,
}

/// Raw options of the `kill-switch` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KillSwitchInput {
    pub private_key: Option<String>,
    pub module_address: Option<String>,
}

/// Validated `kill-switch` command.
#[derive(Debug, Clone)]
pub struct KillSwitchCommand {
    pub module: Address,
    pub sender_key: PrivateKey,
}

/// Treat absent and blank values alike.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn require<'a>(
    value: &'a Option<String>,
    flag: &'static str,
    missing: &mut Vec<&'static str>,
) -> &'a str {
    match present(value) {
        Some(v) => v,
        None => {
            missing.push(flag);
            ""
        }
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Parse a 20-byte hex address.
pub fn parse_address(value: &str, field: &'static str) -> Result<Address, ValidationError> {
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(strip_hex_prefix(value), &mut bytes).map_err(|e| {
        ValidationError::InvalidAddress {
            field,
            reason: e.to_string(),
        }
    })?;
    Ok(Address::from(bytes))
}

/// Parse a 32-byte hex value.
pub fn parse_hash(value: &str, field: &'static str) -> Result<Hash, ValidationError> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(strip_hex_prefix(value), &mut bytes).map_err(|e| {
        ValidationError::InvalidHash {
            field,
            reason: e.to_string(),
        }
    })?;
    Ok(Hash::from(bytes))
}

/// Parse a 32-byte hex private key.
pub fn parse_private_key(value: &str, field: &'static str) -> Result<PrivateKey, ValidationError> {
    PrivateKey::from_hex(value).ok_or(ValidationError::InvalidPrivateKey { field })
}

impl RegistryCommandInput {
    /// Validate every field, reporting all missing options at once.
    pub fn validate(&self) -> Result<RegistryCommand, ValidationError> {
        let mut missing = Vec::new();
        let command = require(&self.command, "--command", &mut missing);
        let private_key = require(&self.private_key, "--private-key", &mut missing);
        let authorizer_private_key = require(
            &self.authorizer_private_key,
            "--authorizer-private-key",
            &mut missing,
        );
        let authorizer = require(&self.authorizer, "--authorizer", &mut missing);
        let registry_address = require(&self.registry_address, "--registry-address", &mut missing);
        let domain_name = require(&self.domain_name, "--domain-name", &mut missing);
        let public_key_hash = require(&self.public_key_hash, "--public-key-hash", &mut missing);

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let action: AuthorizationAction = command.parse()?;

        Ok(RegistryCommand {
            request: AuthorizationRequest {
                action,
                record: DomainRecord {
                    domain_name: domain_name.to_string(),
                    public_key_hash: parse_hash(public_key_hash, "--public-key-hash")?,
                },
                authorizer: parse_address(authorizer, "--authorizer")?,
            },
            registry: parse_address(registry_address, "--registry-address")?,
            sender_key: parse_private_key(private_key, "--private-key")?,
            authorizer_key: parse_private_key(authorizer_private_key, "--authorizer-private-key")?,
        })
    }
}

impl KillSwitchInput {
    pub fn validate(&self) -> Result<KillSwitchCommand, ValidationError> {
        let mut missing = Vec::new();
        let private_key = require(&self.private_key, "--private-key", &mut missing);
        let module_address = require(&self.module_address, "--module-address", &mut missing);

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(KillSwitchCommand {
            module: parse_address(module_address, "--module-address")?,
            sender_key: parse_private_key(private_key, "--private-key")?,
        })
    }
}
