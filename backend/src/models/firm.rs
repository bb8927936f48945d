//! Firm model
//!
//! Firms employ households, pay wages, sell consumption goods, and borrow
//! from the bank on a fixed investment schedule. Production and pricing are
//! out of scope: revenue is whatever the goods market routes to the firm.

use crate::models::borrower::{Borrower, Depositor};
use serde::{Deserialize, Serialize};

/// Investment borrowing schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
    /// Months between investment loan requests (0 disables investment)
    pub interval_months: u32,

    /// Principal requested each time
    pub loan_amount: f64,

    /// Loan term in months
    pub loan_term: u32,

    /// Minimum cash before the firm will take on investment debt
    pub cash_buffer: f64,
}

impl Default for InvestmentPlan {
    fn default() -> Self {
        Self {
            interval_months: 12,
            loan_amount: 50_000.0,
            loan_term: 48,
            cash_buffer: 0.0,
        }
    }
}

/// Why a firm failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankruptcyCause {
    /// Could not meet the payroll
    MissedPayroll,

    /// Debt above total assets with negative cash
    Insolvent,
}

/// A firm agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firm {
    alive: bool,
    wage_level: f64,
    cash: f64,
    debt: f64,

    /// Book value of investment financed by loans
    capital_stock: f64,

    /// Household indices on the payroll
    employees: Vec<usize>,

    /// Headcount the firm hires back up to
    target_employees: usize,

    plan: InvestmentPlan,
    months_since_investment: u32,
}

impl Firm {
    pub fn new(wage_level: f64, initial_cash: f64, plan: InvestmentPlan) -> Self {
        Self {
            alive: true,
            wage_level,
            cash: initial_cash,
            debt: 0.0,
            capital_stock: 0.0,
            employees: Vec::new(),
            target_employees: 0,
            plan,
            months_since_investment: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn wage_level(&self) -> f64 {
        self.wage_level
    }

    pub fn capital_stock(&self) -> f64 {
        self.capital_stock
    }

    pub fn employees(&self) -> &[usize] {
        &self.employees
    }

    pub fn target_employees(&self) -> usize {
        self.target_employees
    }

    pub fn vacancies(&self) -> usize {
        if !self.alive {
            return 0;
        }
        self.target_employees.saturating_sub(self.employees.len())
    }

    pub fn plan(&self) -> &InvestmentPlan {
        &self.plan
    }

    /// Cash plus capital stock, floored at zero (liquidation value for the bank)
    pub fn recovery_value(&self) -> f64 {
        (self.cash + self.capital_stock).max(0.0)
    }

    pub fn add_employee(&mut self, household: usize) {
        if !self.employees.contains(&household) {
            self.employees.push(household);
        }
    }

    pub fn remove_employee(&mut self, household: usize) {
        self.employees.retain(|&h| h != household);
    }

    /// Freeze the current headcount as the hiring target
    pub fn lock_target_headcount(&mut self) {
        self.target_employees = self.employees.len();
    }

    pub fn set_target_employees(&mut self, target: usize) {
        self.target_employees = target;
    }

    pub fn receive_revenue(&mut self, amount: f64) {
        self.cash += amount;
    }

    /// Pay one wage from cash; `false` means the payroll was missed
    pub fn try_pay_wage(&mut self, wage: f64) -> bool {
        if self.cash < wage {
            return false;
        }
        self.cash -= wage;
        true
    }

    /// Advance the investment clock; true when a loan request is due
    pub fn investment_due(&mut self) -> bool {
        if self.plan.interval_months == 0 || !self.alive {
            return false;
        }
        self.months_since_investment += 1;
        self.months_since_investment >= self.plan.interval_months
            && self.cash >= self.plan.cash_buffer
    }

    /// Sink approved investment proceeds into capital stock
    pub fn commit_investment(&mut self, amount: f64) {
        self.capital_stock += amount;
        self.cash -= amount;
        self.months_since_investment = 0;
    }

    /// Debt above assets while cash is negative
    pub fn is_insolvent(&self) -> bool {
        self.alive && self.debt > self.cash + self.capital_stock && self.cash < 0.0
    }

    /// Shut down; returns the released employees
    pub fn go_bankrupt(&mut self) -> Vec<usize> {
        self.alive = false;
        self.target_employees = 0;
        std::mem::take(&mut self.employees)
    }

    #[doc(hidden)]
    pub fn set_cash(&mut self, cash: f64) {
        self.cash = cash;
    }
}

impl Depositor for Firm {
    fn cash(&self) -> f64 {
        self.cash
    }

    fn receive_deposit_interest(&mut self, amount: f64) {
        self.cash += amount;
    }
}

impl Borrower for Firm {
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
        payment
    }

    fn debt(&self) -> f64 {
        self.debt
    }
}
