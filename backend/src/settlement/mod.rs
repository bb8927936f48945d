//! Monthly settlement
//!
//! The bank's end-of-month procedure, in this order:
//!
//! 1. reset the cycle counters
//! 2. collect instalments, walking the ledger in insertion order
//! 3. pay deposit interest
//! 4. recompute the lending-halt flag
//! 5. snapshot the loan metrics
//!
//! Steps 2 to 4 live here as free functions over the ledger and balance
//! sheet; the [`Bank`](crate::bank::Bank) sequences them and owns step 5.
//!
//! # Critical Invariants
//!
//! 1. Each borrower's payment is applied in full before the next loan is visited
//! 2. Per cycle, `total_loans` drops by exactly the principal collected plus
//!    the balances defaulted or written off
//! 3. A loan is never collected in the cycle it was originated in

pub mod cycle;
pub mod write_off;

pub use cycle::{collect_payments, pay_deposit_interest, update_lending_halt};
pub use write_off::{write_off_borrower, WriteOff};

use crate::bank::config::BankConfig;
use crate::models::event::EventLog;
use serde::{Deserialize, Serialize};

/// Flows recognized during one settlement cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleTotals {
    /// Interest collected, credited to equity
    pub interest_income: f64,

    /// Losses on loans defaulted this cycle
    pub default_losses: f64,

    pub deposit_interest_paid: f64,

    /// Losses on borrower write-offs since the previous cycle
    pub write_off_losses: f64,

    pub principal_collected: f64,

    /// Balances removed from the book by defaults
    pub defaulted_balance: f64,

    pub payments: usize,
    pub defaults: usize,
    pub repaid: usize,
}

/// Shared inputs and outputs of one settlement cycle
pub struct Cycle<'a> {
    pub month: u32,
    pub config: &'a BankConfig,
    pub events: &'a mut EventLog,
    pub totals: CycleTotals,
}

impl<'a> Cycle<'a> {
    pub fn new(month: u32, config: &'a BankConfig, events: &'a mut EventLog) -> Self {
        Self {
            month,
            config,
            events,
            totals: CycleTotals::default(),
        }
    }
}
