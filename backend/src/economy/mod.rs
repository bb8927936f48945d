//! Economy - monthly simulation loop
//!
//! Composition root: owns the population, the bank, the state, the calendar
//! and the RNG, and runs every agent in a fixed order each month.
//!
//! ```text
//! For each month m:
//! 1. Labour market (retirements, matching)
//! 2. State (income tax, benefits, pensions)
//! 3. Firms (investment loans, payroll, bankruptcy)
//! 4. Households (reserve rebalance, top-up loans, consumption)
//! 5. Goods market (consumption split over alive firms)
//! 6. Bank settlement cycle
//! 7. Demographics (ageing, death, inheritance)
//! 8. Month record
//! ```
//!
//! # Example
//!
//! ```rust
//! use econosim_core_rs::economy::{Economy, EconomyConfig};
//!
//! let config = EconomyConfig::from_json_str(r#"{"agents": {"households": 20, "firms": 2}}"#).unwrap();
//! let mut economy = Economy::new(config).unwrap();
//! economy.run_for_months(6);
//!
//! assert_eq!(economy.month(), 6);
//! assert_eq!(economy.records().len(), 6);
//! ```

pub mod config;
pub mod labor;
pub mod state;

pub use config::EconomyConfig;
pub use state::{FiscalFlows, StateLedger};

use crate::bank::{Bank, CheckpointError, ConfigError};
use crate::core::time::Calendar;
use crate::credit::underwriting::LoanRequest;
use crate::models::borrower::{BorrowerId, BorrowerKind, Depositor};
use crate::models::firm::{BankruptcyCause, Firm};
use crate::models::household::Household;
use crate::models::population::Population;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Term of household buffer top-up loans
pub const BUFFER_TOP_UP_TERM_MONTHS: i32 = 24;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

/// Aggregates recorded at the end of each month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: u32,
    pub money_supply: f64,
    pub total_loans: f64,
    pub capital_ratio: f64,
    pub equity: f64,

    /// Cumulative losses on defaults and write-offs
    pub default_losses: f64,

    pub performing_share: f64,
    pub investment_loan_share: f64,
    pub stop_lending: bool,
    pub unemployment_rate: f64,
    pub population: usize,
    pub active_firms: usize,
    pub state_balance: f64,
    pub consumption: f64,
}

pub struct Economy {
    config: EconomyConfig,
    population: Population,
    bank: Bank,
    state: StateLedger,
    calendar: Calendar,
    rng: RngManager,
    records: Vec<MonthRecord>,
}

impl Economy {
    /// Build the initial population and open the bank
    pub fn new(config: EconomyConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut rng = RngManager::new(config.simulation.seed);

        let wage = config.wages.initial;
        let firms: Vec<Firm> = (0..config.agents.firms)
            .map(|_| Firm::new(wage, config.firms.initial_cash(wage), config.firms.plan()))
            .collect();

        let hh_cfg = &config.households;
        let households: Vec<Household> = (0..config.agents.households)
            .map(|_| {
                let age = rng.range_inclusive(hh_cfg.initial_age_min, hh_cfg.initial_age_max);
                Household::new(age, hh_cfg.initial_cash, hh_cfg.params())
            })
            .collect();

        let mut population = Population::new(households, firms);
        Self::assign_initial_jobs(&mut population, hh_cfg.retirement_age);

        let bank = Bank::new(config.banking.clone(), &population)?;
        tracing::info!(
            "Economy created: {} households, {} firms, seed {}",
            population.households.len(),
            population.firms.len(),
            config.simulation.seed
        );

        Ok(Self {
            config,
            population,
            bank,
            state: StateLedger::new(),
            calendar: Calendar::new(),
            rng,
            records: Vec::new(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        Self::new(EconomyConfig::from_json_str(json)?)
    }

    /// Working-age households spread round-robin over firms
    fn assign_initial_jobs(population: &mut Population, retirement_age: u32) {
        let n_firms = population.firms.len();
        if n_firms == 0 {
            return;
        }
        for (i, hh) in population.households.iter_mut().enumerate() {
            if hh.age() >= retirement_age {
                continue;
            }
            let firm = i % n_firms;
            hh.hire(firm, population.firms[firm].wage_level());
            population.firms[firm].add_employee(i);
        }
        for firm in population.firms.iter_mut() {
            firm.lock_target_headcount();
        }
    }

    /// Advance one month
    pub fn step(&mut self) -> &MonthRecord {
        let month = self.calendar.advance_month();
        self.bank.set_month(month);

        labor::run_labor_market(
            &mut self.population,
            self.config.households.retirement_age,
            &mut self.rng,
        );

        self.state.step(
            &mut self.population,
            self.config.taxes.income_flat_rate,
            self.config.transfers.unemployment_benefit,
            self.config.transfers.pension,
            self.config.households.retirement_age,
        );

        self.step_firms();
        let consumption = self.step_households();
        self.distribute_revenue(consumption);

        self.bank.step(&mut self.population);

        self.step_demographics();

        let record = self.record(month, consumption);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn run_for_months(&mut self, months: u32) {
        for _ in 0..months {
            self.step();
        }
    }

    /// Run the configured number of months
    pub fn run(&mut self) {
        self.run_for_months(self.config.simulation.months);
    }

    fn step_firms(&mut self) {
        for index in 0..self.population.firms.len() {
            if !self.population.firms[index].is_alive() {
                continue;
            }

            if self.population.firms[index].investment_due() && !self.bank.stop_lending() {
                let plan = self.population.firms[index].plan().clone();
                let request = LoanRequest::new(BorrowerId::Firm(index), plan.loan_amount)
                    .with_kind(BorrowerKind::Firm)
                    .with_term(i32::try_from(plan.loan_term).unwrap_or(i32::MAX))
                    .with_purpose("investment");
                if self.bank.request_loan(&mut self.population, request) {
                    self.population.firms[index].commit_investment(plan.loan_amount);
                }
            }

            if let Some(cause) = self.pay_wages(index) {
                self.bankrupt_firm(index, cause);
                continue;
            }

            if self.population.firms[index].is_insolvent() {
                self.bankrupt_firm(index, BankruptcyCause::Insolvent);
            }
        }
    }

    /// Pay each employee in turn; stops at the first wage the firm cannot cover
    fn pay_wages(&mut self, index: usize) -> Option<BankruptcyCause> {
        let Population { households, firms } = &mut self.population;
        let firm = &mut firms[index];
        let staff = firm.employees().to_vec();
        for employee in staff {
            let Some(hh) = households.get_mut(employee) else {
                continue;
            };
            let wage = hh.wage();
            if !firm.try_pay_wage(wage) {
                return Some(BankruptcyCause::MissedPayroll);
            }
            hh.receive_income(wage);
        }
        None
    }

    fn bankrupt_firm(&mut self, index: usize, cause: BankruptcyCause) {
        let firm = &mut self.population.firms[index];
        let released = firm.go_bankrupt();
        let recovery = firm.recovery_value();
        for employee in released {
            if let Some(hh) = self.population.households.get_mut(employee) {
                hh.lose_job();
            }
        }
        tracing::warn!(
            "Firm {} bankrupt ({:?}) in month {}",
            index,
            cause,
            self.calendar.current_month()
        );
        self.bank
            .write_off_borrower(&mut self.population, BorrowerId::Firm(index), recovery);
    }

    fn step_households(&mut self) -> f64 {
        let floor = self.config.households.cash_floor();
        let target = self.config.households.cash_target();
        let mut consumption = 0.0;

        for index in 0..self.population.households.len() {
            if !self.population.households[index].is_alive() {
                continue;
            }
            let id = BorrowerId::Household(index);

            let expected = self.bank.expected_payment_for(id);
            let hh = &mut self.population.households[index];
            hh.rebalance_debt_service_reserve(expected);

            if let Some(needed) = hh.buffer_shortfall(floor, target) {
                let request = LoanRequest::new(id, needed)
                    .with_kind(BorrowerKind::Household)
                    .with_term(BUFFER_TOP_UP_TERM_MONTHS)
                    .with_purpose("buffer_top_up");
                self.bank.request_loan(&mut self.population, request);
            }

            consumption += self.population.households[index].consume();
        }
        consumption
    }

    /// Consumption becomes revenue, split evenly over alive firms
    fn distribute_revenue(&mut self, consumption: f64) {
        let alive = self.population.alive_firms();
        if alive == 0 || consumption <= 0.0 {
            return;
        }
        let share = consumption / alive as f64;
        for firm in self.population.firms.iter_mut().filter(|f| f.is_alive()) {
            firm.receive_revenue(share);
        }
    }

    fn step_demographics(&mut self) {
        let hh_cfg = &self.config.households;
        let max_age = hh_cfg.max_age;
        let monthly_death_prob = hh_cfg.death_prob_per_year / 12.0;

        if self.calendar.is_year_boundary() {
            for hh in self.population.households.iter_mut().filter(|h| h.is_alive()) {
                hh.add_year();
            }
        }

        for index in 0..self.population.households.len() {
            let hh = &self.population.households[index];
            if !hh.is_alive() {
                continue;
            }
            let dies = hh.age() >= max_age || self.rng.chance(monthly_death_prob);
            if dies {
                self.household_dies(index);
            }
        }
    }

    /// Settle the estate with the bank, then split what is left over the living
    fn household_dies(&mut self, index: usize) {
        let recovery = self.population.households[index].cash().max(0.0);
        self.bank.write_off_borrower(
            &mut self.population,
            BorrowerId::Household(index),
            recovery,
        );

        let hh = &mut self.population.households[index];
        let employer = hh.employer();
        let estate = hh.die();
        if let Some(firm) = employer.and_then(|f| self.population.firms.get_mut(f)) {
            firm.remove_employee(index);
        }

        let heirs: Vec<usize> = self
            .population
            .households
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != index && h.is_alive())
            .map(|(i, _)| i)
            .collect();
        if estate > 0.0 && !heirs.is_empty() {
            let share = estate / heirs.len() as f64;
            for heir in heirs {
                self.population.households[heir].receive_windfall(share);
            }
        }
        tracing::debug!("Household {} died, estate {:.2}", index, estate);
    }

    /// Admit a new household; its seed cash counts as a new deposit
    pub fn add_household(&mut self, age: u32, cash: f64) -> BorrowerId {
        let params = self.config.households.params();
        let id = self
            .population
            .push_household(Household::new(age, cash, params));
        self.bank.record_new_deposit(cash);
        id
    }

    fn record(&self, month: u32, consumption: f64) -> MonthRecord {
        let metrics = self.bank.loan_metrics();
        MonthRecord {
            month,
            money_supply: self.bank.money_supply(),
            total_loans: self.bank.total_loans(),
            capital_ratio: self.bank.capital_ratio(),
            equity: self.bank.equity(),
            default_losses: self.bank.total_defaulted(),
            performing_share: metrics.performing_share,
            investment_loan_share: metrics.purpose_share("investment"),
            stop_lending: self.bank.stop_lending(),
            unemployment_rate: self.unemployment_rate(),
            population: self.population.alive_households(),
            active_firms: self.population.alive_firms(),
            state_balance: self.state.balance(),
            consumption,
        }
    }

    /// Share of alive working-age households without a job
    pub fn unemployment_rate(&self) -> f64 {
        let retirement_age = self.config.households.retirement_age;
        let (labour_force, unemployed) = self
            .population
            .households
            .iter()
            .filter(|h| h.is_alive() && h.age() < retirement_age)
            .fold((0usize, 0usize), |(n, u), h| {
                (n + 1, u + usize::from(!h.is_employed()))
            });
        if labour_force == 0 {
            0.0
        } else {
            unemployed as f64 / labour_force as f64
        }
    }

    pub fn month(&self) -> u32 {
        self.calendar.current_month()
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn state(&self) -> &StateLedger {
        &self.state
    }

    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }
}

impl std::fmt::Debug for Economy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Economy")
            .field("month", &self.calendar.current_month())
            .field("households", &self.population.households.len())
            .field("firms", &self.population.firms.len())
            .field("total_loans", &self.bank.total_loans())
            .finish()
    }
}
