//! # Curve Parameters
//! 
//! Launch-time configuration shared by every curve on the platform.

use crate::constants::*;
use crate::errors::{CurveError, CurveResult};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Baseline and graduation settings for a curve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct CurveParams {
    /// Virtual SOL seeded at creation
    pub initial_virtual_sol: f64,
    /// Real SOL required to graduate
    pub graduation_threshold_sol: f64,
    /// Token supply in whole tokens
    pub total_supply: f64,
}

impl Default for CurveParams {
    fn default() -> Self {
        Self {
            initial_virtual_sol: DEFAULT_INITIAL_VIRTUAL_SOL,
            graduation_threshold_sol: DEFAULT_GRADUATION_THRESHOLD_SOL,
            total_supply: DEFAULT_TOTAL_SUPPLY,
        }
    }
}

impl CurveParams {
    pub fn validate(&self) -> CurveResult<()> {
        if !self.initial_virtual_sol.is_finite() || self.initial_virtual_sol < 0.0 {
            return Err(CurveError::InvalidInitialVirtualSol(self.initial_virtual_sol));
        }
        if !self.graduation_threshold_sol.is_finite() || self.graduation_threshold_sol <= 0.0 {
            return Err(CurveError::InvalidGraduationThreshold(self.graduation_threshold_sol));
        }
        if !self.total_supply.is_finite() || self.total_supply <= 0.0 {
            return Err(CurveError::InvalidTotalSupply(self.total_supply));
        }
        Ok(())
    }

    /// Same parameters with a different supply (e.g. read from the mint)
    pub fn with_total_supply(mut self, total_supply: f64) -> Self {
        self.total_supply = total_supply;
        self
    }
}
