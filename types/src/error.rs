//! Validation errors raised before any external call is made.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("invalid profile: {0}")]
    Profile(String),
}
