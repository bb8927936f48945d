//! Bank checkpoints
//!
//! Serializable snapshot of everything the bank owns, for pause/resume.
//!
//! # Critical Invariants
//!
//! - **Config Matching**: a snapshot only restores under the config it was taken with
//! - **Cache Integrity**: cached `total_loans` matches the ledger's active principal

use crate::bank::balance_sheet::BalanceSheet;
use crate::credit::ledger::LoanLedger;
use crate::credit::metrics::MetricsSnapshot;
use crate::models::event::EventLog;
use crate::settlement::CycleTotals;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Relative tolerance between cached and recomputed loan totals
pub const AGGREGATE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum CheckpointError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("config hash mismatch: snapshot {expected}, current {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("cached total loans {cached} does not match ledger principal {recomputed}")]
    InconsistentLedger { cached: f64, recomputed: f64 },
}

/// Complete bank state at the end of a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSnapshot {
    pub month: u32,

    /// SHA-256 of the canonical JSON of the bank config
    pub config_hash: String,

    pub ledger: LoanLedger,
    pub balance_sheet: BalanceSheet,
    pub metrics_history: Vec<MetricsSnapshot>,
    pub last_cycle: CycleTotals,
    pub pending_write_off_losses: f64,
    pub events: EventLog,
}

impl BankSnapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    /// Check the cached loan total against the ledger
    pub fn validate(&self) -> Result<(), CheckpointError> {
        let recomputed = self.ledger.outstanding_principal();
        if !self
            .balance_sheet
            .loans_match(recomputed, AGGREGATE_TOLERANCE)
        {
            return Err(CheckpointError::InconsistentLedger {
                cached: self.balance_sheet.total_loans(),
                recomputed,
            });
        }
        Ok(())
    }
}

/// Deterministic SHA-256 of a config
///
/// Object keys are sorted recursively before hashing so field order never
/// changes the digest.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, CheckpointError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| CheckpointError::Serialization(format!("config: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| CheckpointError::Serialization(format!("config: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
