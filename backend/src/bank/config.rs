//! Bank configuration
//!
//! Loaded from the `banking` section of the economy configuration. Every key
//! is optional and falls back to its default; unknown keys are ignored.

use crate::models::borrower::BorrowerKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation and loading errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

pub const DEFAULT_EVENT_LOG_LIMIT: usize = 100_000;

/// Credit parameters of the single bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub deposit_rate_annual: f64,
    pub loan_rate_base_annual: f64,
    pub household_spread: f64,
    pub firm_spread: f64,

    /// Minimum equity / total loans for new lending
    pub capital_ratio_min: f64,

    /// Months of deposit interest held as a liquidity buffer
    pub liquidity_buffer_months: f64,

    /// Household debt cap as a multiple of annual income
    pub max_loan_to_income: f64,

    /// Household instalment cap as a share of monthly income
    pub max_debt_service_ratio: f64,

    /// Fraction of a defaulted balance recovered into cash reserves
    pub default_recovery_rate: f64,

    pub initial_equity: f64,

    /// Slack allowed when comparing a payment against the interest due
    pub default_tolerance: f64,

    /// Balances at or below this are treated as fully repaid
    pub negligible_balance: f64,

    /// Most credit events kept in the log; `null` keeps every event
    pub event_log_limit: Option<usize>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            deposit_rate_annual: 0.0,
            loan_rate_base_annual: 0.02,
            household_spread: 0.02,
            firm_spread: 0.025,
            capital_ratio_min: 0.08,
            liquidity_buffer_months: 3.0,
            max_loan_to_income: 4.0,
            max_debt_service_ratio: 0.35,
            default_recovery_rate: 0.2,
            initial_equity: 100_000.0,
            default_tolerance: 1e-9,
            negligible_balance: 1e-6,
            event_log_limit: Some(DEFAULT_EVENT_LOG_LIMIT),
        }
    }
}

impl BankConfig {
    pub fn monthly_deposit_rate(&self) -> f64 {
        self.deposit_rate_annual / 12.0
    }

    /// Annual lending rate for a borrower category
    pub fn loan_rate_for(&self, kind: BorrowerKind) -> f64 {
        match kind {
            BorrowerKind::Household => self.loan_rate_base_annual + self.household_spread,
            BorrowerKind::Firm => self.loan_rate_base_annual + self.firm_spread,
        }
    }

    /// Check every field, failing on the first bad one
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("deposit_rate_annual", self.deposit_rate_annual),
            ("loan_rate_base_annual", self.loan_rate_base_annual),
            ("household_spread", self.household_spread),
            ("firm_spread", self.firm_spread),
            ("capital_ratio_min", self.capital_ratio_min),
            ("liquidity_buffer_months", self.liquidity_buffer_months),
            ("max_loan_to_income", self.max_loan_to_income),
            ("max_debt_service_ratio", self.max_debt_service_ratio),
            ("default_recovery_rate", self.default_recovery_rate),
            ("initial_equity", self.initial_equity),
            ("default_tolerance", self.default_tolerance),
            ("negligible_balance", self.negligible_balance),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }

        // Equity is the only key allowed below zero
        for (field, value) in fields {
            if field != "initial_equity" && value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.default_recovery_rate > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "default_recovery_rate",
                value: self.default_recovery_rate,
                min: 0.0,
                max: 1.0,
            });
        }

        Ok(())
    }
}
