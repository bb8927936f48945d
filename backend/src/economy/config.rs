//! Economy configuration
//!
//! One JSON document with a section per concern. Every section and every
//! key is optional; unknown keys are ignored.
//!
//! ```json
//! {
//!   "simulation": { "months": 120, "seed": 42 },
//!   "agents": { "households": 100, "firms": 3 },
//!   "wages": { "initial": 2500.0 },
//!   "banking": { "deposit_rate_annual": 0.01 }
//! }
//! ```

use crate::bank::config::{BankConfig, ConfigError};
use crate::models::firm::InvestmentPlan;
use crate::models::household::HouseholdParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    pub months: u32,
    pub seed: u64,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            months: 120,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsSection {
    pub households: usize,
    pub firms: usize,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            households: 100,
            firms: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdsSection {
    pub initial_cash: f64,
    pub propensity_to_consume: f64,
    pub initial_age_min: u32,
    pub initial_age_max: u32,

    /// Available cash below this triggers a buffer top-up loan
    /// (default: 20% of initial cash)
    pub cash_floor: Option<f64>,

    /// Cash level a top-up loan aims for
    /// (default: max(50% of initial cash, floor + 1))
    pub cash_target: Option<f64>,

    pub debt_service_income_share: f64,
    pub debt_service_buffer_multiplier: f64,
    pub retirement_age: u32,
    pub max_age: u32,
    pub death_prob_per_year: f64,
}

impl Default for HouseholdsSection {
    fn default() -> Self {
        Self {
            initial_cash: 5_000.0,
            propensity_to_consume: 0.8,
            initial_age_min: 20,
            initial_age_max: 65,
            cash_floor: None,
            cash_target: None,
            debt_service_income_share: 0.25,
            debt_service_buffer_multiplier: 1.1,
            retirement_age: 65,
            max_age: 90,
            death_prob_per_year: 0.01,
        }
    }
}

impl HouseholdsSection {
    pub fn cash_floor(&self) -> f64 {
        self.cash_floor.unwrap_or(self.initial_cash * 0.2)
    }

    pub fn cash_target(&self) -> f64 {
        self.cash_target
            .unwrap_or_else(|| (self.initial_cash * 0.5).max(self.cash_floor() + 1.0))
    }

    pub fn params(&self) -> HouseholdParams {
        HouseholdParams {
            propensity_to_consume: self.propensity_to_consume,
            debt_service_income_share: self.debt_service_income_share,
            debt_service_buffer_multiplier: self.debt_service_buffer_multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirmsSection {
    /// Opening cash; defaults to six months of payroll for 35 workers
    pub initial_cash: Option<f64>,

    pub investment_interval_months: u32,
    pub investment_loan_amount: f64,
    pub investment_loan_term: u32,
    pub investment_cash_buffer: f64,
}

impl Default for FirmsSection {
    fn default() -> Self {
        let plan = InvestmentPlan::default();
        Self {
            initial_cash: None,
            investment_interval_months: plan.interval_months,
            investment_loan_amount: plan.loan_amount,
            investment_loan_term: plan.loan_term,
            investment_cash_buffer: plan.cash_buffer,
        }
    }
}

impl FirmsSection {
    pub fn initial_cash(&self, wage_level: f64) -> f64 {
        self.initial_cash.unwrap_or(wage_level * 35.0 * 6.0)
    }

    pub fn plan(&self) -> InvestmentPlan {
        InvestmentPlan {
            interval_months: self.investment_interval_months,
            loan_amount: self.investment_loan_amount,
            loan_term: self.investment_loan_term.max(1),
            cash_buffer: self.investment_cash_buffer.max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WagesSection {
    pub initial: f64,
}

impl Default for WagesSection {
    fn default() -> Self {
        Self { initial: 2_500.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxesSection {
    pub income_flat_rate: f64,
}

impl Default for TaxesSection {
    fn default() -> Self {
        Self {
            income_flat_rate: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransfersSection {
    pub unemployment_benefit: f64,
    pub pension: f64,
}

impl Default for TransfersSection {
    fn default() -> Self {
        Self {
            unemployment_benefit: 1_200.0,
            pension: 1_500.0,
        }
    }
}

/// Complete scenario configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub simulation: SimulationSection,
    pub agents: AgentsSection,
    pub households: HouseholdsSection,
    pub firms: FirmsSection,
    pub wages: WagesSection,
    pub taxes: TaxesSection,
    pub transfers: TransfersSection,
    pub banking: BankConfig,
}

impl EconomyConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.banking.validate()?;

        let hh = &self.households;
        let fields = [
            ("households.initial_cash", hh.initial_cash),
            ("households.propensity_to_consume", hh.propensity_to_consume),
            ("households.cash_floor", hh.cash_floor()),
            ("households.cash_target", hh.cash_target()),
            (
                "households.debt_service_income_share",
                hh.debt_service_income_share,
            ),
            (
                "households.debt_service_buffer_multiplier",
                hh.debt_service_buffer_multiplier,
            ),
            ("households.death_prob_per_year", hh.death_prob_per_year),
            ("firms.investment_loan_amount", self.firms.investment_loan_amount),
            ("firms.investment_cash_buffer", self.firms.investment_cash_buffer),
            ("wages.initial", self.wages.initial),
            ("taxes.income_flat_rate", self.taxes.income_flat_rate),
            ("transfers.unemployment_benefit", self.transfers.unemployment_benefit),
            ("transfers.pension", self.transfers.pension),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if let Some(cash) = self.firms.initial_cash {
            if !cash.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "firms.initial_cash",
                    value: cash,
                });
            }
        }

        for (field, value) in [
            ("households.propensity_to_consume", hh.propensity_to_consume),
            (
                "households.debt_service_income_share",
                hh.debt_service_income_share,
            ),
            ("households.death_prob_per_year", hh.death_prob_per_year),
            ("taxes.income_flat_rate", self.taxes.income_flat_rate),
        ] {
            if value > 1.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }

        if hh.initial_age_min > hh.initial_age_max {
            return Err(ConfigError::Invalid(format!(
                "households.initial_age_min ({}) exceeds initial_age_max ({})",
                hh.initial_age_min, hh.initial_age_max
            )));
        }

        Ok(())
    }
}
