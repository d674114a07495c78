//! # Canonical Message Builder
//!
//! The registry contract re-derives this exact string from the call arguments
//! and recovers the signer from it, so the format is wire-compatible and must
//! not change:
//!
//! ```text
//! <PREFIX>domain=<domainName>;public_key_hash=0x<64 lowercase hex>;
//! ```
//!
//! The domain is interpolated verbatim. A domain containing `;` or `=` yields
//! an ambiguous message; it is reported by [`has_delimiters`] and left as is.

use super::entities::{to_hex, AuthorizationAction, CanonicalMessage, Hash};

/// Characters that separate fields in the canonical message.
pub const DELIMITERS: [char; 2] = [';', '='];

/// Build the canonical message for an authorization.
pub fn build(
    action: AuthorizationAction,
    domain_name: &str,
    public_key_hash: &Hash,
) -> CanonicalMessage {
    CanonicalMessage::new(format!(
        "{}domain={};public_key_hash={};",
        action.prefix(),
        domain_name,
        to_hex(public_key_hash.as_bytes())
    ))
}

/// Whether a domain name would make the canonical message ambiguous.
pub fn has_delimiters(domain_name: &str) -> bool {
    domain_name.contains(DELIMITERS)
}
