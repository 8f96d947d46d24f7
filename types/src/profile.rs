//! Artist profile payload stored off-ledger.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// The profile an artist submits for verification.
///
/// Immutable once stored — a resubmission produces a new payload and a new
/// content reference, never a mutation of an existing one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    pub bio: String,
    pub portfolio_url: String,
    pub email: String,
    #[serde(default)]
    pub social: SocialLinks,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_style: Option<String>,
}

/// Optional social-media handles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl ArtistProfile {
    /// Validate the profile before it reaches the content store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Profile("name must not be empty".into()));
        }
        if self.bio.trim().is_empty() {
            return Err(ValidationError::Profile("bio must not be empty".into()));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::Profile(format!(
                "email is not an address: {}",
                self.email
            )));
        }
        if !self.portfolio_url.starts_with("http://") && !self.portfolio_url.starts_with("https://")
        {
            return Err(ValidationError::Profile(format!(
                "portfolio URL must be http(s): {}",
                self.portfolio_url
            )));
        }
        Ok(())
    }

    /// Serialize to the canonical byte payload stored off-ledger.
    ///
    /// Field order is fixed by the struct definition, so equal profiles
    /// always produce identical bytes (and therefore identical content
    /// references).
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("profile serialization cannot fail")
    }

    /// Parse a payload previously produced by [`canonical_bytes`].
    ///
    /// [`canonical_bytes`]: ArtistProfile::canonical_bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
