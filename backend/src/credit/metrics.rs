//! Loan book metrics
//!
//! Derived from the ledger alone, so recomputing twice without an
//! intervening mutation gives identical results.

use crate::credit::ledger::LoanLedger;
use crate::models::loan::LoanStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Age buckets as (label, start inclusive, end exclusive) in months
pub const AGE_BUCKETS: [(&str, u32, u32); 4] = [
    ("0_6", 0, 6),
    ("6_12", 6, 12),
    ("12_24", 12, 24),
    ("24_plus", 24, u32::MAX),
];

fn bucket_label(age_months: u32) -> &'static str {
    AGE_BUCKETS
        .iter()
        .find(|(_, start, end)| age_months >= *start && age_months < *end)
        .map(|(label, _, _)| *label)
        .unwrap_or("24_plus")
}

/// Point-in-time view of the loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanMetrics {
    /// Σ balance over active loans with a positive balance
    pub active_balance: f64,

    /// active / (active + nonperforming), 1.0 with an empty book
    pub performing_share: f64,

    /// Σ original balance over defaulted loans
    pub nonperforming_balance: f64,

    pub avg_active_age: f64,

    /// Share of active balance per age bucket label
    pub age_bucket_shares: BTreeMap<String, f64>,

    /// Share of active balance per purpose tag
    pub purpose_shares: BTreeMap<String, f64>,
}

impl Default for LoanMetrics {
    fn default() -> Self {
        Self {
            active_balance: 0.0,
            performing_share: 1.0,
            nonperforming_balance: 0.0,
            avg_active_age: 0.0,
            age_bucket_shares: AGE_BUCKETS
                .iter()
                .map(|(label, _, _)| (label.to_string(), 0.0))
                .collect(),
            purpose_shares: BTreeMap::new(),
        }
    }
}

impl LoanMetrics {
    pub fn compute(ledger: &LoanLedger) -> Self {
        let active: Vec<_> = ledger
            .loans()
            .iter()
            .filter(|l| l.is_active() && l.balance() > 0.0)
            .collect();

        let active_balance = active.iter().fold(0.0, |acc, l| acc + l.balance());
        let nonperforming_balance: f64 = ledger
            .loans()
            .iter()
            .filter(|l| l.status() == LoanStatus::Defaulted)
            .fold(0.0, |acc, l| acc + l.original_balance());

        let denominator = active_balance + nonperforming_balance;
        let performing_share = if denominator > 0.0 {
            active_balance / denominator
        } else {
            1.0
        };

        let avg_active_age = if active.is_empty() {
            0.0
        } else {
            active.iter().map(|l| f64::from(l.age_months())).sum::<f64>() / active.len() as f64
        };

        let mut metrics = Self {
            active_balance,
            performing_share,
            nonperforming_balance,
            avg_active_age,
            ..Self::default()
        };

        for loan in &active {
            *metrics
                .age_bucket_shares
                .entry(bucket_label(loan.age_months()).to_string())
                .or_insert(0.0) += loan.balance();
            *metrics
                .purpose_shares
                .entry(loan.purpose().to_string())
                .or_insert(0.0) += loan.balance();
        }

        if active_balance > 0.0 {
            for share in metrics
                .age_bucket_shares
                .values_mut()
                .chain(metrics.purpose_shares.values_mut())
            {
                *share /= active_balance;
            }
        }

        metrics
    }

    /// Purpose share, 0.0 for tags with no active balance
    pub fn purpose_share(&self, purpose: &str) -> f64 {
        self.purpose_shares.get(purpose).copied().unwrap_or(0.0)
    }

    pub fn age_bucket_share(&self, label: &str) -> f64 {
        self.age_bucket_shares.get(label).copied().unwrap_or(0.0)
    }

    /// Flat key/value view (`age_bucket_<label>_share`, `purpose_<tag>_share`)
    pub fn as_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        map.insert("active_balance".to_string(), self.active_balance);
        map.insert("performing_share".to_string(), self.performing_share);
        map.insert(
            "nonperforming_balance".to_string(),
            self.nonperforming_balance,
        );
        map.insert("avg_active_age".to_string(), self.avg_active_age);
        for (label, share) in &self.age_bucket_shares {
            map.insert(format!("age_bucket_{}_share", label), *share);
        }
        for (purpose, share) in &self.purpose_shares {
            map.insert(format!("purpose_{}_share", purpose), *share);
        }
        map
    }
}

/// Metrics recorded at the end of a settlement cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub month: u32,

    #[serde(flatten)]
    pub metrics: LoanMetrics,
}
