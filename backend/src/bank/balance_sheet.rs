//! Bank balance sheet
//!
//! Aggregate positions only. Per-loan state lives in the ledger; the
//! `total_loans` figure here is an incremental cache of the ledger's active
//! principal and is checked against a recomputation in tests and on restore.
//!
//! # Critical Invariants
//!
//! 1. `total_loans` equals the sum of active loan balances
//! 2. Equity moves only on interest income, default losses, write-off losses
//!    and deposit interest expense
//! 3. Equity may go negative; it is never clamped

use crate::bank::config::BankConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub(crate) equity: f64,
    pub(crate) cash_reserves: f64,
    pub(crate) total_loans: f64,
    pub(crate) total_deposits: f64,

    /// Cumulative losses recognized on defaults and write-offs
    pub(crate) total_defaulted: f64,

    pub(crate) stop_lending: bool,
}

impl BalanceSheet {
    /// Seed equity doubles as opening cash; positive existing deposits are
    /// added to both deposits and reserves
    pub fn open(initial_equity: f64, existing_deposits: f64) -> Self {
        let mut sheet = Self {
            equity: initial_equity,
            cash_reserves: initial_equity,
            total_loans: 0.0,
            total_deposits: 0.0,
            total_defaulted: 0.0,
            stop_lending: false,
        };
        if existing_deposits > 0.0 {
            sheet.total_deposits += existing_deposits;
            sheet.cash_reserves += existing_deposits;
        }
        sheet
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn cash_reserves(&self) -> f64 {
        self.cash_reserves
    }

    pub fn total_loans(&self) -> f64 {
        self.total_loans
    }

    pub fn total_deposits(&self) -> f64 {
        self.total_deposits
    }

    pub fn total_defaulted(&self) -> f64 {
        self.total_defaulted
    }

    pub fn stop_lending(&self) -> bool {
        self.stop_lending
    }

    /// Equity over total loans, 1.0 with no loans, floored at zero
    pub fn capital_ratio(&self) -> f64 {
        if self.total_loans <= 0.0 {
            return 1.0;
        }
        (self.equity / self.total_loans).max(0.0)
    }

    /// Equity over loans after adding `amount`, unfloored
    ///
    /// `None` when the projected loan book is not positive.
    pub fn projected_capital_ratio(&self, amount: f64) -> Option<f64> {
        let projected = self.total_loans + amount;
        (projected > 0.0).then(|| self.equity / projected)
    }

    /// Deposits floored at zero
    pub fn money_supply(&self) -> f64 {
        self.total_deposits.max(0.0)
    }

    /// Cash reserves needed to cover the configured months of deposit interest
    pub fn required_liquidity_buffer(&self, config: &BankConfig) -> f64 {
        self.total_deposits * config.monthly_deposit_rate() * config.liquidity_buffer_months
    }

    /// Reserves below the buffer; never stressed without a deposit rate
    pub fn is_liquidity_stressed(&self, config: &BankConfig) -> bool {
        if config.monthly_deposit_rate() <= 0.0 {
            return false;
        }
        self.cash_reserves < self.required_liquidity_buffer(config)
    }

    /// New loan proceeds land on the borrower's deposit account
    pub(crate) fn book_loan(&mut self, amount: f64) {
        self.total_loans += amount;
        self.total_deposits += amount;
    }

    pub(crate) fn record_deposit(&mut self, amount: f64) {
        self.total_deposits += amount;
        self.cash_reserves += amount;
    }

    /// Instalment moved out of deposits into reserves
    pub(crate) fn collect(&mut self, paid: f64, interest_paid: f64, principal_paid: f64) {
        self.total_loans = (self.total_loans - principal_paid).max(0.0);
        self.total_deposits = (self.total_deposits - paid).max(0.0);
        self.cash_reserves += paid;
        self.equity += interest_paid;
    }

    /// Remove a whole balance from the book, recovering part of it
    pub(crate) fn charge_off(&mut self, balance: f64, recovered: f64, loss: f64) {
        self.total_loans = (self.total_loans - balance).max(0.0);
        self.cash_reserves += recovered;
        self.equity -= loss;
        self.total_defaulted += loss;
    }

    /// Cash the borrower paid over as part of a write-off leaves deposits
    pub(crate) fn withdraw_deposits(&mut self, amount: f64) {
        self.total_deposits = (self.total_deposits - amount).max(0.0);
    }

    pub(crate) fn pay_deposit_interest(&mut self, total: f64) {
        self.total_deposits += total;
        self.cash_reserves -= total;
        self.equity -= total;
    }

    /// Cached `total_loans` within `relative_tolerance` of `expected`
    pub fn loans_match(&self, expected: f64, relative_tolerance: f64) -> bool {
        let scale = expected.abs().max(self.total_loans.abs()).max(1.0);
        (self.total_loans - expected).abs() <= relative_tolerance * scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_adds_positive_deposits() {
        let sheet = BalanceSheet::open(1_000.0, 500.0);
        assert_eq!(sheet.cash_reserves(), 1_500.0);
        assert_eq!(sheet.total_deposits(), 500.0);

        let sheet = BalanceSheet::open(1_000.0, -20.0);
        assert_eq!(sheet.cash_reserves(), 1_000.0);
        assert_eq!(sheet.total_deposits(), 0.0);
    }

    #[test]
    fn test_capital_ratio_floor_only_on_public_ratio() {
        let mut sheet = BalanceSheet::open(-100.0, 0.0);
        assert_eq!(sheet.capital_ratio(), 1.0);
        sheet.book_loan(1_000.0);
        assert_eq!(sheet.capital_ratio(), 0.0);
        assert_eq!(sheet.projected_capital_ratio(0.0), Some(-0.1));
    }

    #[test]
    fn test_liquidity_stress_needs_deposit_rate() {
        let mut config = BankConfig::default();
        let mut sheet = BalanceSheet::open(0.0, 0.0);
        sheet.book_loan(1_000_000.0);
        assert!(!sheet.is_liquidity_stressed(&config));

        config.deposit_rate_annual = 0.12;
        assert!((sheet.required_liquidity_buffer(&config) - 30_000.0).abs() < 1e-6);
        assert!(sheet.is_liquidity_stressed(&config));
    }

    #[test]
    fn test_collect_floors_aggregates() {
        let mut sheet = BalanceSheet::open(0.0, 0.0);
        sheet.collect(10.0, 2.0, 8.0);
        assert_eq!(sheet.total_loans(), 0.0);
        assert_eq!(sheet.total_deposits(), 0.0);
        assert_eq!(sheet.cash_reserves(), 10.0);
        assert_eq!(sheet.equity(), 2.0);
    }
}
