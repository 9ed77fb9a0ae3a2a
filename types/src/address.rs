//! Wallet address type and fixed-width normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonicalize a wallet address into the fixed-width form used as a
/// storage key: `0x` + 40 lowercase hex characters.
///
/// Steps: strip a leading `0x` if present, left-pad with `0` to 40
/// characters (inputs longer than 40 are left as-is, never truncated),
/// lowercase, re-prepend `0x`. The empty string is returned unchanged.
///
/// Total and idempotent; every identifier must pass through here before
/// being used as a store key, or lookups silently miss.
pub fn normalize_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let bare = address.strip_prefix("0x").unwrap_or(address);
    let bare = bare.to_lowercase();

    if bare.len() >= 40 {
        return format!("0x{bare}");
    }
    format!("0x{}{}", "0".repeat(40 - bare.len()), bare)
}

/// A wallet address in normalized form.
///
/// Construction always normalizes, so two addresses that differ only in
/// prefix, case, or leading-zero padding compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address from a raw string, normalizing it.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize_address(raw.as_ref()))
    }

    /// Return the normalized address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is empty (no wallet connected).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode the address into its 20 raw bytes.
    ///
    /// Fails for empty addresses and for over-length inputs that were
    /// preserved as-is by normalization.
    pub fn as_bytes(&self) -> Result<[u8; 20], crate::YamError> {
        let bare = self.0.strip_prefix("0x").unwrap_or(&self.0);
        let decoded = hex::decode(bare)
            .map_err(|e| crate::YamError::InvalidAddress(format!("{}: {e}", self.0)))?;
        decoded
            .try_into()
            .map_err(|_| crate::YamError::InvalidAddress(format!("{}: not 20 bytes", self.0)))
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
