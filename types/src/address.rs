//! Artist wallet address type with `0x` prefix.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An artist's wallet address: `0x` followed by 40 hex characters.
///
/// Stored in canonical lowercase so that two spellings of the same address
/// compare equal and hash identically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtistAddress(String);

impl ArtistAddress {
    /// The standard prefix for all artist addresses.
    pub const PREFIX: &'static str = "0x";

    /// Parse and canonicalize an address string.
    ///
    /// Rejects anything that is not `0x` + 40 hex characters.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let rest = raw
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| ValidationError::Address(format!("missing 0x prefix: {raw}")))?;
        if rest.len() != 40 {
            return Err(ValidationError::Address(format!(
                "expected 40 hex characters after 0x, got {}",
                rest.len()
            )));
        }
        if !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::Address(format!(
                "non-hex character in address: {raw}"
            )));
        }
        Ok(Self(format!("{}{}", Self::PREFIX, rest.to_ascii_lowercase())))
    }

    /// Return the canonical address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtistAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
