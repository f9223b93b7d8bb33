//! # Reserve Snapshot
//! 
//! Instantaneous state of a bonding curve as read from chain. Snapshots are
//! fetched fresh for every price request and never mutated here.

use crate::constants::{LAMPORTS_PER_SOL, MAX_TOKEN_DECIMALS};
use crate::errors::{CurveError, CurveResult};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Virtual reserves of a curve, in whole SOL and whole tokens
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "client", serde(rename_all = "camelCase"))]
pub struct ReserveSnapshot {
    pub virtual_sol_reserves: f64,
    pub virtual_token_reserves: f64,
    /// Pool has moved to its permanent venue
    pub is_migrated: bool,
}

impl ReserveSnapshot {
    pub fn new(virtual_sol_reserves: f64, virtual_token_reserves: f64, is_migrated: bool) -> Self {
        Self {
            virtual_sol_reserves,
            virtual_token_reserves,
            is_migrated,
        }
    }

    /// Build a snapshot from on-chain integer units
    pub fn from_raw(
        virtual_sol_lamports: u64,
        virtual_token_base_units: u64,
        token_decimals: u8,
        is_migrated: bool,
    ) -> CurveResult<Self> {
        if token_decimals > MAX_TOKEN_DECIMALS {
            return Err(CurveError::InvalidDecimals(token_decimals));
        }
        let token_scale = 10f64.powi(token_decimals as i32);

        Ok(Self {
            virtual_sol_reserves: virtual_sol_lamports as f64 / LAMPORTS_PER_SOL as f64,
            virtual_token_reserves: virtual_token_base_units as f64 / token_scale,
            is_migrated,
        })
    }

    /// Both reserves are finite and positive, so a price exists
    pub fn is_priceable(&self) -> bool {
        is_positive_finite(self.virtual_sol_reserves) && is_positive_finite(self.virtual_token_reserves)
    }
}

pub(crate) fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
