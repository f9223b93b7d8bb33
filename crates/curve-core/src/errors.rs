//! # Curve Error Types
//! 
//! Errors for invalid curve configuration. Degenerate reserve snapshots are
//! not errors; they degrade to unavailable metrics.

use thiserror::Error;

/// Curve configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveError {
    #[error("Initial virtual SOL must be finite and non-negative, got {0}")]
    InvalidInitialVirtualSol(f64),

    #[error("Graduation threshold must be finite and positive, got {0}")]
    InvalidGraduationThreshold(f64),

    #[error("Total supply must be finite and positive, got {0}")]
    InvalidTotalSupply(f64),

    #[error("Token decimals {0} exceed the supported maximum")]
    InvalidDecimals(u8),
}

/// Result type for curve operations
pub type CurveResult<T> = Result<T, CurveError>;
