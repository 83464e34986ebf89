use sha2::{Digest, Sha256};

use crate::Address;

/// Derive an opaque ledger address from a human-readable label.
///
/// The surrounding platform issues real addresses; this helper exists for
/// demos and tests that need stable, distinct identities.
pub fn address_from_label(label: &str) -> Address {
    let mut hasher = Sha256::new();
    hasher.update(label.as_bytes());
    hasher.finalize()[..20].to_vec()
}

/// Hex representation of an address for log output.
pub fn address_hex(address: &Address) -> String {
    hex::encode(address)
}
