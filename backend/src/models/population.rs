//! Population of agents
//!
//! Owns every household and firm. Agents are never removed, so indices
//! double as stable [`BorrowerId`] handles.

use crate::models::borrower::{Borrower, BorrowerId, BorrowerRegistry, Depositor};
use crate::models::firm::Firm;
use crate::models::household::Household;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub households: Vec<Household>,
    pub firms: Vec<Firm>,
}

impl Population {
    pub fn new(households: Vec<Household>, firms: Vec<Firm>) -> Self {
        Self { households, firms }
    }

    pub fn household(&self, index: usize) -> Option<&Household> {
        self.households.get(index)
    }

    pub fn firm(&self, index: usize) -> Option<&Firm> {
        self.firms.get(index)
    }

    pub fn alive_households(&self) -> usize {
        self.households.iter().filter(|h| h.is_alive()).count()
    }

    pub fn alive_firms(&self) -> usize {
        self.firms.iter().filter(|f| f.is_alive()).count()
    }

    /// Append a household and return its handle
    pub fn push_household(&mut self, household: Household) -> BorrowerId {
        self.households.push(household);
        BorrowerId::Household(self.households.len() - 1)
    }

    /// Debt as seen by the agent behind a handle
    pub fn debt_of(&self, id: BorrowerId) -> Option<f64> {
        match id {
            BorrowerId::Household(i) => self.households.get(i).map(|h| h.debt()),
            BorrowerId::Firm(i) => self.firms.get(i).map(|f| f.debt()),
        }
    }
}

impl BorrowerRegistry for Population {
    fn borrower_mut(&mut self, id: BorrowerId) -> Option<&mut dyn Borrower> {
        match id {
            BorrowerId::Household(i) => self
                .households
                .get_mut(i)
                .map(|h| h as &mut dyn Borrower),
            BorrowerId::Firm(i) => self.firms.get_mut(i).map(|f| f as &mut dyn Borrower),
        }
    }

    fn visit_depositors(&mut self, visit: &mut dyn FnMut(&mut dyn Depositor)) {
        for household in self.households.iter_mut() {
            visit(household);
        }
        for firm in self.firms.iter_mut() {
            visit(firm);
        }
    }

    fn total_cash(&self) -> f64 {
        let households = self.households.iter().fold(0.0, |acc, h| acc + h.cash());
        let firms = self.firms.iter().fold(0.0, |acc, f| acc + f.cash());
        households + firms
    }
}
