//! Events streamed by a mining run
//!
//! A run yields zero or more non-terminal events followed by exactly one
//! terminal event (`complete` or `error`).

use crate::store::PoolBreakdown;
use serde::{Deserialize, Serialize};

/// Summary carried by the terminal `complete` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSummary {
    /// Keypairs found during this run
    pub found: u64,
    pub attempts: u64,
    pub duration_ms: u64,
    /// Attempts per second over the whole run
    pub rate: f64,
    /// Addresses found this run, in discovery order
    pub addresses: Vec<String>,
    /// Available keypairs for the suffix after the run
    pub pool_size: u64,
    pub breakdown: PoolBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MiningEvent {
    /// Run accepted and generation is about to begin
    Start {
        suffix: String,
        target_count: u32,
        pool_size: u64,
        max_duration_ms: u64,
    },
    /// A matching keypair was generated (and handed to the sink)
    Found {
        address: String,
        found: u64,
        attempts: u64,
        elapsed_ms: u64,
        rate: f64,
    },
    /// Periodic heartbeat between batches
    Progress {
        attempts: u64,
        found: u64,
        elapsed_ms: u64,
        rate: f64,
        /// Share of the time budget consumed, 0-100
        percent: f64,
    },
    Complete(CompleteSummary),
    Error {
        message: String,
        /// Addresses already reported before the fault
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        addresses: Vec<String>,
    },
}

impl MiningEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MiningEvent::Complete(_) | MiningEvent::Error { .. })
    }

    /// Wire name of the event, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            MiningEvent::Start { .. } => "start",
            MiningEvent::Found { .. } => "found",
            MiningEvent::Progress { .. } => "progress",
            MiningEvent::Complete(_) => "complete",
            MiningEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_serialization() {
        let event = MiningEvent::Progress {
            attempts: 3000,
            found: 1,
            elapsed_ms: 2000,
            rate: 1500.0,
            percent: 3.6,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["attempts"], 3000);

        let complete = MiningEvent::Complete(CompleteSummary {
            found: 0,
            attempts: 0,
            duration_ms: 0,
            rate: 0.0,
            addresses: vec![],
            pool_size: 4,
            breakdown: PoolBreakdown::new(),
        });
        let json = serde_json::to_value(&complete).unwrap();
        assert_eq!(json["type"], "complete");
        assert_eq!(json["pool_size"], 4);
        assert!(complete.is_terminal());
        assert_eq!(complete.kind(), "complete");
    }

    #[test]
    fn test_error_omits_empty_addresses() {
        let event = MiningEvent::Error {
            message: "boom".to_string(),
            addresses: vec![],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert!(json.get("addresses").is_none());
    }
}
