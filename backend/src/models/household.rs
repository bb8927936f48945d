//! Household model
//!
//! A household earns wages or transfers, consumes, saves on deposit at the
//! bank, and may borrow to top up its cash buffer. A share of every income
//! inflow is earmarked as a debt-service reserve so scheduled loan payments
//! are not consumed away before the bank collects them.

use crate::models::borrower::{Borrower, Depositor};
use serde::{Deserialize, Serialize};

/// Household behavioural parameters shared by the whole population
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdParams {
    /// Fraction of available cash spent each month
    pub propensity_to_consume: f64,

    /// Share of each income inflow moved into the debt-service reserve
    pub debt_service_income_share: f64,

    /// Reserve target as a multiple of the next expected bank payment
    pub debt_service_buffer_multiplier: f64,
}

impl Default for HouseholdParams {
    fn default() -> Self {
        Self {
            propensity_to_consume: 0.8,
            debt_service_income_share: 0.25,
            debt_service_buffer_multiplier: 1.1,
        }
    }
}

/// A household agent
///
/// # Example
/// ```
/// use econosim_core_rs::models::{Borrower, Depositor, Household, HouseholdParams};
///
/// let mut hh = Household::new(35, 1_000.0, HouseholdParams::default());
/// assert_eq!(hh.pay_debt(1_500.0), 1_000.0); // capped by cash
/// assert_eq!(hh.cash(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    age: u32,
    alive: bool,
    employed: bool,

    /// Index of the employing firm
    employer: Option<usize>,

    /// Monthly gross wage while employed
    wage: f64,

    cash: f64,
    debt: f64,

    /// Cash held back for scheduled loan payments (≤ cash)
    debt_service_reserve: f64,

    /// Monthly transfer the household would receive when not employed
    fallback_income: f64,

    params: HouseholdParams,
}

impl Household {
    pub fn new(age: u32, initial_cash: f64, params: HouseholdParams) -> Self {
        Self {
            age,
            alive: true,
            employed: false,
            employer: None,
            wage: 0.0,
            cash: initial_cash,
            debt: 0.0,
            debt_service_reserve: 0.0,
            fallback_income: 0.0,
            params,
        }
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_employed(&self) -> bool {
        self.employed
    }

    pub fn employer(&self) -> Option<usize> {
        self.employer
    }

    pub fn wage(&self) -> f64 {
        self.wage
    }

    pub fn debt_service_reserve(&self) -> f64 {
        self.debt_service_reserve
    }

    /// Cash not earmarked for debt service
    pub fn available_cash(&self) -> f64 {
        (self.cash - self.debt_service_reserve).max(0.0)
    }

    pub fn hire(&mut self, firm: usize, wage: f64) {
        self.employed = true;
        self.employer = Some(firm);
        self.wage = wage;
    }

    pub fn lose_job(&mut self) {
        self.employed = false;
        self.employer = None;
        self.wage = 0.0;
    }

    pub fn set_fallback_income(&mut self, amount: f64) {
        self.fallback_income = amount.max(0.0);
    }

    pub fn add_year(&mut self) {
        self.age += 1;
    }

    /// Wage or other income; part of it tops up the debt-service reserve
    pub fn receive_income(&mut self, amount: f64) {
        self.cash += amount;
        self.allocate_reserve_share(amount);
    }

    pub fn receive_transfer(&mut self, amount: f64) {
        self.receive_income(amount);
    }

    /// Inheritance and other windfalls do not feed the reserve
    pub fn receive_windfall(&mut self, amount: f64) {
        self.cash += amount;
    }

    pub fn pay_tax(&mut self, amount: f64) {
        self.cash -= amount;
        self.debt_service_reserve = self.debt_service_reserve.min(self.cash.max(0.0));
    }

    /// Spend the propensity share of available cash; returns the amount spent
    pub fn consume(&mut self) -> f64 {
        let available = self.available_cash();
        if self.cash <= 0.0 || available <= 0.0 {
            return 0.0;
        }
        let spent = self.params.propensity_to_consume * available;
        self.cash -= spent;
        self.debt_service_reserve = self.debt_service_reserve.min(self.cash);
        spent
    }

    /// Reset the reserve to the buffered expected bank payment, capped by cash
    pub fn rebalance_debt_service_reserve(&mut self, expected_payment: f64) {
        if expected_payment <= 0.0 {
            self.debt_service_reserve = 0.0;
            return;
        }
        let target = expected_payment * self.params.debt_service_buffer_multiplier;
        self.debt_service_reserve = target.min(self.cash).max(0.0);
    }

    /// Amount to borrow to get back to `cash_target`, if available cash is below `cash_floor`
    pub fn buffer_shortfall(&self, cash_floor: f64, cash_target: f64) -> Option<f64> {
        let available = self.available_cash();
        if available >= cash_floor {
            return None;
        }
        let needed = (cash_target - available).max(0.0);
        (needed > 0.0).then_some(needed)
    }

    /// Mark dead and hand over the estate cash; debt is settled by the bank beforehand
    pub fn die(&mut self) -> f64 {
        self.alive = false;
        self.lose_job();
        let estate = self.cash.max(0.0);
        self.cash = 0.0;
        self.debt = 0.0;
        self.debt_service_reserve = 0.0;
        estate
    }

    fn allocate_reserve_share(&mut self, inflow: f64) {
        if inflow <= 0.0 || self.params.debt_service_income_share <= 0.0 {
            return;
        }
        let allocation = inflow * self.params.debt_service_income_share;
        self.debt_service_reserve = (self.debt_service_reserve + allocation).min(self.cash);
    }

    #[doc(hidden)]
    pub fn set_cash(&mut self, cash: f64) {
        self.cash = cash;
        self.debt_service_reserve = self.debt_service_reserve.min(cash.max(0.0));
    }
}

impl Depositor for Household {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn is_active(&self) -> bool {
        self.alive
    }

    fn receive_deposit_interest(&mut self, amount: f64) {
        self.receive_income(amount);
    }
}

impl Borrower for Household {
    fn receive_loan(&mut self, amount: f64) {
        self.cash += amount;
    }

    fn increase_debt(&mut self, amount: f64) {
        self.debt += amount;
    }

    fn decrease_debt(&mut self, amount: f64) {
        self.debt = (self.debt - amount).max(0.0);
    }

    fn pay_debt(&mut self, amount: f64) -> f64 {
        let payment = self.cash.min(amount).max(0.0);
        self.cash -= payment;
        self.debt_service_reserve = (self.debt_service_reserve - payment).max(0.0);
        payment
    }

    fn expected_monthly_income(&self) -> f64 {
        if self.employed {
            self.wage
        } else {
            self.fallback_income
        }
    }

    fn debt(&self) -> f64 {
        self.debt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn household(cash: f64) -> Household {
        Household::new(40, cash, HouseholdParams::default())
    }

    #[test]
    fn test_income_feeds_reserve() {
        let mut hh = household(0.0);
        hh.receive_income(1_000.0);
        assert_eq!(hh.debt_service_reserve(), 250.0);
        assert_eq!(hh.available_cash(), 750.0);
    }

    #[test]
    fn test_consumption_respects_reserve() {
        let mut hh = household(0.0);
        hh.receive_income(1_000.0);
        let spent = hh.consume();
        assert!((spent - 600.0).abs() < 1e-9);
        assert!(hh.cash() >= hh.debt_service_reserve());
    }

    #[test]
    fn test_pay_debt_drains_reserve() {
        let mut hh = household(0.0);
        hh.receive_income(1_000.0);
        let paid = hh.pay_debt(300.0);
        assert_eq!(paid, 300.0);
        assert_eq!(hh.debt_service_reserve(), 0.0);
        assert_eq!(hh.cash(), 700.0);
    }

    #[test]
    fn test_negative_cash_pays_nothing() {
        let mut hh = household(-50.0);
        assert_eq!(hh.pay_debt(100.0), 0.0);
        assert_eq!(hh.cash(), -50.0);
    }

    #[test]
    fn test_expected_income_switches_on_employment() {
        let mut hh = household(0.0);
        hh.set_fallback_income(1_200.0);
        assert_eq!(hh.expected_monthly_income(), 1_200.0);
        hh.hire(0, 3_000.0);
        assert_eq!(hh.expected_monthly_income(), 3_000.0);
    }

    #[test]
    fn test_buffer_shortfall() {
        let hh = household(100.0);
        assert_eq!(hh.buffer_shortfall(500.0, 2_000.0), Some(1_900.0));
        assert_eq!(hh.buffer_shortfall(50.0, 2_000.0), None);
    }

    #[test]
    fn test_decrease_debt_floors_at_zero() {
        let mut hh = household(0.0);
        hh.increase_debt(100.0);
        hh.decrease_debt(250.0);
        assert_eq!(hh.debt(), 0.0);
    }
}
