//! Borrower capability
//!
//! The bank never owns the agents it lends to. A loan record holds a
//! [`BorrowerId`] handle, and every cash or debt change goes through the
//! [`Borrower`] trait on an agent resolved from a [`BorrowerRegistry`] for
//! the duration of one call.
//!
//! # Critical Invariants
//!
//! 1. The bank mutates borrower state only through this trait
//! 2. `pay_debt` never pays more than requested
//! 3. Handles are stable for the whole run (agents are marked dead, never removed)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Borrower category, selects the rate spread and affordability rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowerKind {
    Household,
    Firm,
}

impl fmt::Display for BorrowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowerKind::Household => write!(f, "household"),
            BorrowerKind::Firm => write!(f, "firm"),
        }
    }
}

/// Non-owning handle to an agent in the population
///
/// The index is the agent's position in its population collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum BorrowerId {
    Household(usize),
    Firm(usize),
}

impl BorrowerId {
    /// Category of the agent behind this handle
    pub fn kind(&self) -> BorrowerKind {
        match self {
            BorrowerId::Household(_) => BorrowerKind::Household,
            BorrowerId::Firm(_) => BorrowerKind::Firm,
        }
    }
}

impl fmt::Display for BorrowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BorrowerId::Household(i) => write!(f, "household#{}", i),
            BorrowerId::Firm(i) => write!(f, "firm#{}", i),
        }
    }
}

/// An agent holding a deposit account at the bank
pub trait Depositor {
    /// Cash currently on deposit
    fn cash(&self) -> f64;

    /// Whether the agent still participates (dead households do not earn interest)
    fn is_active(&self) -> bool {
        true
    }

    /// Credit monthly deposit interest
    fn receive_deposit_interest(&mut self, amount: f64);
}

/// Capability an agent must provide to take part in credit
pub trait Borrower: Depositor {
    /// Credit loan proceeds to the agent's cash
    fn receive_loan(&mut self, amount: f64);

    /// Record new debt taken on
    fn increase_debt(&mut self, amount: f64);

    /// Record debt extinguished (repayment or write-off); floors at zero
    fn decrease_debt(&mut self, amount: f64);

    /// Attempt to pay `amount`; returns what was actually paid (≤ amount)
    fn pay_debt(&mut self, amount: f64) -> f64;

    /// Expected monthly income used for affordability checks
    ///
    /// Only consulted for household borrowers.
    fn expected_monthly_income(&self) -> f64 {
        0.0
    }

    /// Debt currently carried
    fn debt(&self) -> f64;
}

/// Resolves borrower handles for the bank
///
/// Implemented by whatever owns the agents (the economy's population);
/// tests implement it over small fixtures.
pub trait BorrowerRegistry {
    /// Resolve a handle to a mutable borrower, `None` for unknown handles
    fn borrower_mut(&mut self, id: BorrowerId) -> Option<&mut dyn Borrower>;

    /// Visit every depositor, households first then firms, in collection order
    fn visit_depositors(&mut self, visit: &mut dyn FnMut(&mut dyn Depositor));

    /// Sum of all agents' cash (initial deposit estimate)
    fn total_cash(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_kind() {
        assert_eq!(BorrowerId::Household(3).kind(), BorrowerKind::Household);
        assert_eq!(BorrowerId::Firm(0).kind(), BorrowerKind::Firm);
    }

    #[test]
    fn test_handle_serializes_tagged() {
        let json = serde_json::to_string(&BorrowerId::Firm(2)).unwrap();
        assert_eq!(json, r#"{"kind":"firm","index":2}"#);
    }
}
