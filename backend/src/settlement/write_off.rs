//! Borrower write-off
//!
//! When a borrower leaves the economy (firm bankruptcy, household death)
//! every active loan it holds defaults at once. The bank recovers up to the
//! stated recovery value; whatever part of that the borrower still holds in
//! cash is collected through `pay_debt` and leaves the deposit base.

use crate::bank::balance_sheet::BalanceSheet;
use crate::credit::ledger::LoanLedger;
use crate::models::borrower::{BorrowerId, BorrowerRegistry};
use crate::models::event::{Event, EventLog};
use serde::{Deserialize, Serialize};

/// Outcome of writing off one borrower
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteOff {
    /// Loans moved to defaulted
    pub loans: usize,

    /// Σ balance of those loans
    pub outstanding: f64,

    /// min(recovery value, outstanding)
    pub recovered: f64,

    /// Part of `recovered` paid over in cash
    pub cash_collected: f64,

    /// outstanding − recovered, charged to equity
    pub loss: f64,
}

pub fn write_off_borrower<R>(
    ledger: &mut LoanLedger,
    sheet: &mut BalanceSheet,
    registry: &mut R,
    borrower: BorrowerId,
    recovery_value: f64,
    events: &mut EventLog,
    month: u32,
) -> WriteOff
where
    R: BorrowerRegistry + ?Sized,
{
    let mut outcome = WriteOff::default();
    for loan in ledger
        .loans_mut()
        .iter_mut()
        .filter(|l| l.is_active() && l.borrower() == borrower)
    {
        if let Some(balance) = loan.mark_defaulted() {
            outcome.outstanding += balance;
            outcome.loans += 1;
        }
    }

    if outcome.loans == 0 {
        return outcome;
    }

    outcome.recovered = recovery_value.max(0.0).min(outcome.outstanding);
    outcome.loss = outcome.outstanding - outcome.recovered;

    match registry.borrower_mut(borrower) {
        Some(b) => {
            outcome.cash_collected = b.pay_debt(outcome.recovered);
            b.decrease_debt(outcome.outstanding);
        }
        None => tracing::warn!("Writing off unknown borrower {}", borrower),
    }

    sheet.charge_off(outcome.outstanding, outcome.recovered, outcome.loss);
    sheet.withdraw_deposits(outcome.cash_collected);

    tracing::warn!(
        "Wrote off {} ({} loans): outstanding {:.2}, recovered {:.2}, loss {:.2}",
        borrower,
        outcome.loans,
        outcome.outstanding,
        outcome.recovered,
        outcome.loss
    );
    events.log(Event::BorrowerWrittenOff {
        month,
        borrower,
        loans: outcome.loans,
        outstanding: outcome.outstanding,
        recovered: outcome.recovered,
        loss: outcome.loss,
    });

    outcome
}
