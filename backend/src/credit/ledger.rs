//! Loan ledger
//!
//! Every loan the bank has ever issued, in insertion order. Terminal loans
//! stay in the ledger so nonperforming totals and metrics can still see them.
//! Settlement walks the ledger front to back, so insertion order is also
//! collection order.

use crate::credit::amortization::annuity_payment;
use crate::models::borrower::{BorrowerId, BorrowerKind};
use crate::models::loan::{LoanId, LoanRecord, LoanStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanLedger {
    loans: Vec<LoanRecord>,
    next_id: u64,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self {
            loans: Vec::new(),
            next_id: 1,
        }
    }

    /// Book a new active loan and return its id
    #[allow(clippy::too_many_arguments)]
    pub fn book(
        &mut self,
        borrower: BorrowerId,
        kind: BorrowerKind,
        principal: f64,
        annual_rate: f64,
        term_months: u32,
        purpose: String,
        month: u32,
    ) -> LoanId {
        let id = LoanId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        self.loans.push(LoanRecord::new(
            id,
            borrower,
            kind,
            principal,
            annual_rate,
            term_months,
            purpose,
            month,
        ));
        id
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    /// All loans in insertion order
    pub fn loans(&self) -> &[LoanRecord] {
        &self.loans
    }

    pub(crate) fn loans_mut(&mut self) -> &mut [LoanRecord] {
        &mut self.loans
    }

    pub fn get(&self, id: LoanId) -> Option<&LoanRecord> {
        self.loans.iter().find(|l| l.id() == id)
    }

    pub fn active(&self) -> impl Iterator<Item = &LoanRecord> {
        self.loans.iter().filter(|l| l.is_active())
    }

    pub fn count_with_status(&self, status: LoanStatus) -> usize {
        self.loans.iter().filter(|l| l.status() == status).count()
    }

    /// Active loans of one borrower, in insertion order
    pub fn active_for(&self, borrower: BorrowerId) -> impl Iterator<Item = &LoanRecord> {
        self.active().filter(move |l| l.borrower() == borrower)
    }

    /// Sum of active balances, recomputed from scratch
    pub fn outstanding_principal(&self) -> f64 {
        self.active().fold(0.0, |acc, l| acc + l.balance())
    }

    /// Next scheduled instalment summed over the borrower's active loans
    ///
    /// Remaining terms are floored at one month.
    pub fn expected_payment_for(&self, borrower: BorrowerId) -> f64 {
        self.active_for(borrower)
            .fold(0.0, |acc, l| {
                acc + annuity_payment(l.balance(), l.monthly_rate(), l.remaining_term().max(1))
            })
    }
}
