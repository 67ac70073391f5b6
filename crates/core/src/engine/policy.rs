//! Reconciliation Policy

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Who is trusted to mutate stock during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ReconciliationPolicy {
    /// Every add reserves a unit on the inventory service, which returns the
    /// authoritative stock. Removing an entry never gives the unit back.
    ServerAuthoritative,

    /// Adds and removes only touch local stock. Checkout commits the whole
    /// cart in one batch and then reloads the snapshot.
    #[default]
    OptimisticLocal,
}

impl ReconciliationPolicy {
    /// Whether removing an entry returns its unit to local stock.
    pub fn restocks_on_remove(self) -> bool {
        matches!(self, Self::OptimisticLocal)
    }

    /// Whether checkout has to send the cart to the inventory service.
    pub fn commits_on_checkout(self) -> bool {
        matches!(self, Self::OptimisticLocal)
    }
}

impl Display for ReconciliationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ServerAuthoritative => f.write_str("server-authoritative"),
            Self::OptimisticLocal => f.write_str("optimistic"),
        }
    }
}
