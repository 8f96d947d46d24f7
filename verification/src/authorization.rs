//! Authorization seam for state-changing calls.
//!
//! The orchestrator never derives roles itself; it asks an injected
//! [`AuthorizationPort`] whether a caller holds the capability for a
//! write. Authentication (proving the caller controls the address) stays
//! outside this crate.

use async_trait::async_trait;
use atelier_types::ArtistAddress;
use std::collections::HashSet;

/// The write being attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteAction {
    Submit,
    Verify,
    Reject,
}

/// Capability check for state-changing calls.
#[async_trait]
pub trait AuthorizationPort: Send + Sync {
    async fn can_write(
        &self,
        caller: &ArtistAddress,
        subject: &ArtistAddress,
        action: WriteAction,
    ) -> bool;
}

/// Authorizer backed by a configured admin set.
///
/// Submission is a self-service capability: a caller may only submit for
/// their own address. Verify and reject require admin membership.
pub struct StaticAuthorizer {
    admins: HashSet<ArtistAddress>,
}

impl StaticAuthorizer {
    pub fn new(admins: impl IntoIterator<Item = ArtistAddress>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    pub fn is_admin(&self, address: &ArtistAddress) -> bool {
        self.admins.contains(address)
    }
}

#[async_trait]
impl AuthorizationPort for StaticAuthorizer {
    async fn can_write(
        &self,
        caller: &ArtistAddress,
        subject: &ArtistAddress,
        action: WriteAction,
    ) -> bool {
        match action {
            WriteAction::Submit => caller == subject || self.is_admin(caller),
            WriteAction::Verify | WriteAction::Reject => self.is_admin(caller),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: char) -> ArtistAddress {
        ArtistAddress::parse(&format!("0x{}{last}", "0".repeat(39))).unwrap()
    }

    #[tokio::test]
    async fn submit_requires_caller_owns_subject() {
        let authz = StaticAuthorizer::new([]);
        assert!(authz.can_write(&addr('a'), &addr('a'), WriteAction::Submit).await);
        assert!(!authz.can_write(&addr('a'), &addr('b'), WriteAction::Submit).await);
    }

    #[tokio::test]
    async fn privileged_actions_require_admin() {
        let authz = StaticAuthorizer::new([addr('1')]);
        assert!(authz.can_write(&addr('1'), &addr('b'), WriteAction::Verify).await);
        assert!(authz.can_write(&addr('1'), &addr('b'), WriteAction::Reject).await);
        assert!(!authz.can_write(&addr('b'), &addr('b'), WriteAction::Verify).await);
    }

    #[tokio::test]
    async fn admin_may_submit_on_behalf() {
        let authz = StaticAuthorizer::new([addr('1')]);
        assert!(authz.can_write(&addr('1'), &addr('b'), WriteAction::Submit).await);
    }
}
