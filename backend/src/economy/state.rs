//! Public sector
//!
//! Flat income tax on employed households' wages; a flat benefit for the
//! unemployed and a pension for retirees. The state keeps a running cash
//! balance and never borrows from the bank.

use crate::models::population::Population;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateLedger {
    balance: f64,
}

/// Tax and transfer flows of one month
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FiscalFlows {
    pub taxes: f64,
    pub benefits: f64,
    pub pensions: f64,
}

impl StateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative taxes minus transfers
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Collect tax, pay transfers, and refresh each household's fallback income
    pub fn step(
        &mut self,
        population: &mut Population,
        tax_rate: f64,
        unemployment_benefit: f64,
        pension: f64,
        retirement_age: u32,
    ) -> FiscalFlows {
        let mut flows = FiscalFlows::default();

        for hh in population.households.iter_mut().filter(|h| h.is_alive()) {
            let retired = hh.age() >= retirement_age;
            let fallback = if retired { pension } else { unemployment_benefit };
            hh.set_fallback_income(fallback);

            if hh.is_employed() {
                let tax = tax_rate * hh.wage();
                if tax > 0.0 {
                    hh.pay_tax(tax);
                    flows.taxes += tax;
                }
            } else if fallback > 0.0 {
                hh.receive_transfer(fallback);
                if retired {
                    flows.pensions += fallback;
                } else {
                    flows.benefits += fallback;
                }
            }
        }

        self.balance += flows.taxes - flows.benefits - flows.pensions;
        flows
    }
}
