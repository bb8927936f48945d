//! Loan underwriting
//!
//! Decides whether the bank can take on a new loan. Checks run in a fixed
//! order and the first failure is reported:
//!
//! 1. positive amount
//! 2. lending not halted
//! 3. projected capital ratio (unfloored) at or above the minimum
//! 4. household affordability: income, loan-to-income, debt service
//! 5. bank not currently liquidity-stressed
//!
//! Evaluation never mutates anything; booking is the bank's job.

use crate::bank::balance_sheet::BalanceSheet;
use crate::bank::config::BankConfig;
use crate::credit::amortization::annuity_payment;
use crate::models::borrower::{Borrower, BorrowerId, BorrowerKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Term used when a request asks for zero or negative months
pub const DEFAULT_TERM_MONTHS: u32 = 12;

/// A borrower's request for credit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub borrower: BorrowerId,
    pub amount: f64,
    pub kind: BorrowerKind,

    /// Requested term; values ≤ 0 fall back to [`DEFAULT_TERM_MONTHS`]
    pub term_months: i32,

    pub purpose: String,
}

impl LoanRequest {
    /// Request with the borrower's own category, 24 months, "general" purpose
    pub fn new(borrower: BorrowerId, amount: f64) -> Self {
        Self {
            borrower,
            amount,
            kind: borrower.kind(),
            term_months: 24,
            purpose: "general".to_string(),
        }
    }

    pub fn with_term(mut self, term_months: i32) -> Self {
        self.term_months = term_months;
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    /// Underwrite under a different category than the handle implies
    pub fn with_kind(mut self, kind: BorrowerKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn effective_term(&self) -> u32 {
        if self.term_months <= 0 {
            DEFAULT_TERM_MONTHS
        } else {
            self.term_months.unsigned_abs()
        }
    }
}

/// Reason a loan request was turned down
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("requested amount {0} is not positive")]
    NonPositiveAmount(f64),

    #[error("lending is halted")]
    LendingHalted,

    #[error("projected capital ratio {projected:.4} below minimum {minimum:.4}")]
    CapitalRatio { projected: f64, minimum: f64 },

    #[error("borrower has no expected income")]
    NoIncome,

    #[error("debt {debt_after:.2} would exceed loan-to-income cap {cap:.2}")]
    LoanToIncome { debt_after: f64, cap: f64 },

    #[error("instalment {payment:.2} exceeds debt-service cap {cap:.2}")]
    DebtService { payment: f64, cap: f64 },

    #[error("liquidity stressed: reserves {cash_reserves:.2} below buffer {required_buffer:.2}")]
    LiquidityStress {
        cash_reserves: f64,
        required_buffer: f64,
    },

    #[error("unknown borrower {0}")]
    UnknownBorrower(BorrowerId),
}

/// Run every underwriting check against the current bank state
pub fn evaluate(
    request: &LoanRequest,
    borrower: &dyn Borrower,
    sheet: &BalanceSheet,
    config: &BankConfig,
) -> Result<(), Rejection> {
    if request.amount <= 0.0 || request.amount.is_nan() {
        return Err(Rejection::NonPositiveAmount(request.amount));
    }

    if sheet.stop_lending() {
        return Err(Rejection::LendingHalted);
    }

    if let Some(projected) = sheet.projected_capital_ratio(request.amount) {
        if projected < config.capital_ratio_min {
            return Err(Rejection::CapitalRatio {
                projected,
                minimum: config.capital_ratio_min,
            });
        }
    }

    if request.kind == BorrowerKind::Household {
        check_household_affordability(request, borrower, config)?;
    }

    if sheet.is_liquidity_stressed(config) {
        return Err(Rejection::LiquidityStress {
            cash_reserves: sheet.cash_reserves(),
            required_buffer: sheet.required_liquidity_buffer(config),
        });
    }

    Ok(())
}

fn check_household_affordability(
    request: &LoanRequest,
    borrower: &dyn Borrower,
    config: &BankConfig,
) -> Result<(), Rejection> {
    let income = borrower.expected_monthly_income();
    if income <= 0.0 {
        return Err(Rejection::NoIncome);
    }

    let cap = config.max_loan_to_income * income * 12.0;
    let debt_after = borrower.debt() + request.amount;
    if debt_after > cap {
        return Err(Rejection::LoanToIncome { debt_after, cap });
    }

    let monthly_rate = config.loan_rate_for(BorrowerKind::Household) / 12.0;
    let payment = annuity_payment(request.amount, monthly_rate, request.effective_term());
    let cap = config.max_debt_service_ratio * income;
    if payment > cap {
        return Err(Rejection::DebtService { payment, cap });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::household::{Household, HouseholdParams};
    use crate::models::Depositor;

    fn employed(wage: f64) -> Household {
        let mut hh = Household::new(35, 0.0, HouseholdParams::default());
        hh.hire(0, wage);
        hh
    }

    fn request(amount: f64) -> LoanRequest {
        LoanRequest::new(BorrowerId::Household(0), amount).with_term(24)
    }

    #[test]
    fn test_effective_term_fallback() {
        assert_eq!(request(1.0).with_term(0).effective_term(), 12);
        assert_eq!(request(1.0).with_term(-5).effective_term(), 12);
        assert_eq!(request(1.0).with_term(36).effective_term(), 36);
    }

    #[test]
    fn test_approves_affordable_household() {
        let sheet = BalanceSheet::open(100_000.0, 0.0);
        let hh = employed(3_000.0);
        assert_eq!(
            evaluate(&request(5_000.0), &hh, &sheet, &BankConfig::default()),
            Ok(())
        );
        assert_eq!(hh.cash(), 0.0);
    }

    #[test]
    fn test_first_failing_check_wins() {
        let mut sheet = BalanceSheet::open(100.0, 0.0);
        let hh = Household::new(35, 0.0, HouseholdParams::default());
        // no income and a thin capital base: capital ratio is checked first
        let result = evaluate(&request(5_000.0), &hh, &sheet, &BankConfig::default());
        assert!(matches!(result, Err(Rejection::CapitalRatio { .. })));

        sheet.stop_lending = true;
        let result = evaluate(&request(5_000.0), &hh, &sheet, &BankConfig::default());
        assert_eq!(result, Err(Rejection::LendingHalted));
    }

    #[test]
    fn test_debt_service_cap() {
        let sheet = BalanceSheet::open(1_000_000.0, 0.0);
        let hh = employed(1_000.0);
        // 4_500 over 12 months is ~383/month, above 0.35 × 1_000
        let result = evaluate(
            &request(4_500.0).with_term(12),
            &hh,
            &sheet,
            &BankConfig::default(),
        );
        assert!(matches!(result, Err(Rejection::DebtService { .. })));
    }

    #[test]
    fn test_firms_skip_affordability() {
        let sheet = BalanceSheet::open(1_000_000.0, 0.0);
        let hh = Household::new(35, 0.0, HouseholdParams::default());
        let req = request(5_000.0).with_kind(BorrowerKind::Firm);
        assert_eq!(evaluate(&req, &hh, &sheet, &BankConfig::default()), Ok(()));
    }
}
