//! Settlement cycle steps
//!
//! # Collection rules
//!
//! For each active loan in insertion order:
//!
//! - a negligible balance closes the loan as repaid
//! - a loan in its first month only ages (one-cycle grace)
//! - otherwise the annuity instalment is requested; a payment short of the
//!   interest due (beyond the tolerance) defaults the loan
//! - interest is settled before principal
//! - a loan with a negligible balance is closed as repaid
//! - a loan with no term left but principal still owed defaults

use crate::bank::balance_sheet::BalanceSheet;
use crate::credit::amortization::split_payment;
use crate::credit::ledger::LoanLedger;
use crate::models::borrower::{Borrower, BorrowerRegistry, Depositor};
use crate::models::event::Event;
use crate::models::loan::LoanRecord;
use crate::settlement::Cycle;

/// Collect one instalment from every loan due this month
pub fn collect_payments<R>(
    ledger: &mut LoanLedger,
    sheet: &mut BalanceSheet,
    registry: &mut R,
    cycle: &mut Cycle<'_>,
) where
    R: BorrowerRegistry + ?Sized,
{
    let negligible = cycle.config.negligible_balance;

    for loan in ledger.loans_mut().iter_mut() {
        if !loan.is_active() {
            continue;
        }

        if loan.balance() <= negligible {
            close_repaid(loan, cycle);
            continue;
        }

        if loan.age_months() == 0 {
            loan.pass_grace_month();
            continue;
        }

        let split = split_payment(loan.balance(), loan.monthly_rate(), loan.remaining_term());
        let mut borrower = registry.borrower_mut(loan.borrower());
        let paid = match borrower.as_deref_mut() {
            Some(b) => b.pay_debt(split.total_due()),
            None => {
                tracing::warn!(
                    "Loan {} references unknown borrower {}; treating as unpaid",
                    loan.id(),
                    loan.borrower()
                );
                0.0
            }
        };

        if paid + cycle.config.default_tolerance < split.interest_due {
            apply_default(loan, borrower, sheet, cycle);
            continue;
        }

        let interest_paid = split.interest_due.min(paid);
        let principal_paid = (paid - interest_paid).max(0.0);
        let applied = loan.apply_instalment(principal_paid);

        if let Some(b) = borrower.as_deref_mut() {
            b.decrease_debt(applied);
        }
        sheet.collect(paid, interest_paid, applied);

        cycle.totals.interest_income += interest_paid;
        cycle.totals.principal_collected += applied;
        cycle.totals.payments += 1;

        tracing::debug!(
            "Collected {:.2} on {} (interest {:.2}, principal {:.2}, balance {:.2})",
            paid,
            loan.id(),
            interest_paid,
            applied,
            loan.balance()
        );
        cycle.events.log(Event::PaymentCollected {
            month: cycle.month,
            loan_id: loan.id(),
            borrower: loan.borrower(),
            interest: interest_paid,
            principal: applied,
            balance_after: loan.balance(),
        });

        if loan.balance() <= negligible {
            close_repaid(loan, cycle);
        } else if loan.remaining_term() == 0 {
            // Term ran out with principal still owed: same loss split as a missed payment
            tracing::warn!(
                "{} reached end of term with {:.2} outstanding",
                loan.id(),
                loan.balance()
            );
            apply_default(loan, borrower, sheet, cycle);
        }
    }
}

fn close_repaid(loan: &mut LoanRecord, cycle: &mut Cycle<'_>) {
    if loan.mark_repaid() {
        cycle.totals.repaid += 1;
        cycle.events.log(Event::LoanRepaid {
            month: cycle.month,
            loan_id: loan.id(),
            borrower: loan.borrower(),
        });
    }
}

/// Write off a loan after a payment shortfall
///
/// The recovered share of the balance goes to cash reserves and the rest is
/// charged to equity.
fn apply_default(
    loan: &mut LoanRecord,
    borrower: Option<&mut dyn Borrower>,
    sheet: &mut BalanceSheet,
    cycle: &mut Cycle<'_>,
) {
    let Some(balance) = loan.mark_defaulted() else {
        return;
    };
    let recovery_rate = cycle.config.default_recovery_rate;
    let recovered = balance * recovery_rate;
    let loss = balance * (1.0 - recovery_rate);

    sheet.charge_off(balance, recovered, loss);
    if let Some(b) = borrower {
        b.decrease_debt(balance);
    }

    cycle.totals.default_losses += loss;
    cycle.totals.defaulted_balance += balance;
    cycle.totals.defaults += 1;

    tracing::warn!(
        "{} defaulted: balance {:.2}, recovered {:.2}, loss {:.2}",
        loan.id(),
        balance,
        recovered,
        loss
    );
    cycle.events.log(Event::LoanDefaulted {
        month: cycle.month,
        loan_id: loan.id(),
        borrower: loan.borrower(),
        balance,
        recovered,
        loss,
    });
}

/// Credit monthly interest on every active depositor with positive cash
pub fn pay_deposit_interest<R>(sheet: &mut BalanceSheet, registry: &mut R, cycle: &mut Cycle<'_>)
where
    R: BorrowerRegistry + ?Sized,
{
    let rate = cycle.config.monthly_deposit_rate();
    if rate <= 0.0 || sheet.total_deposits() <= 0.0 {
        return;
    }

    let mut total = 0.0;
    let mut depositors = 0;
    registry.visit_depositors(&mut |depositor: &mut dyn Depositor| {
        if !depositor.is_active() || depositor.cash() <= 0.0 {
            return;
        }
        let interest = depositor.cash() * rate;
        depositor.receive_deposit_interest(interest);
        total += interest;
        depositors += 1;
    });

    if total == 0.0 {
        return;
    }

    sheet.pay_deposit_interest(total);
    cycle.totals.deposit_interest_paid = total;
    tracing::debug!(
        "Paid {:.2} deposit interest to {} depositors",
        total,
        depositors
    );
    cycle.events.log(Event::DepositInterestPaid {
        month: cycle.month,
        total,
        depositors,
    });
}

/// Halt new lending when undercapitalized or short of liquidity
///
/// Uses the floored public capital ratio.
pub fn update_lending_halt(sheet: &mut BalanceSheet, cycle: &mut Cycle<'_>) {
    let capital_ratio = sheet.capital_ratio();
    let liquidity_stressed = sheet.is_liquidity_stressed(cycle.config);
    let halted = capital_ratio < cycle.config.capital_ratio_min || liquidity_stressed;

    if halted != sheet.stop_lending {
        tracing::info!(
            "Lending {} (capital ratio {:.4}, liquidity stressed: {})",
            if halted { "halted" } else { "resumed" },
            capital_ratio,
            liquidity_stressed
        );
        cycle.events.log(Event::LendingHaltChanged {
            month: cycle.month,
            halted,
            capital_ratio,
            liquidity_stressed,
        });
    }
    sheet.stop_lending = halted;
}
