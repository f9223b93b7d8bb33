//! # Curve Constants
//! 
//! Unit conversions and the default curve configuration used at launch.

// ============================================================================
// Unit Constants
// ============================================================================

/// Lamports per SOL (9 decimals)
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SOL decimals
pub const SOL_DECIMALS: u8 = 9;

/// Default token decimals for launched mints
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Largest decimals value accepted when scaling raw token amounts
pub const MAX_TOKEN_DECIMALS: u8 = 18;

// ============================================================================
// Curve Defaults
// ============================================================================

/// Virtual SOL seeded into every curve at creation
pub const DEFAULT_INITIAL_VIRTUAL_SOL: f64 = 30.0;

/// Real SOL a curve must collect before it migrates
pub const DEFAULT_GRADUATION_THRESHOLD_SOL: f64 = 85.0;

/// Total supply of a launched token (whole tokens)
pub const DEFAULT_TOTAL_SUPPLY: f64 = 1_000_000_000.0;

/// Bonding progress at which a curve counts as graduated
pub const MAX_BONDING_PROGRESS: f64 = 100.0;

// ============================================================================
// Display
// ============================================================================

/// Significant digits kept when rendering a price
pub const PRICE_SIGNIFICANT_DIGITS: usize = 4;

/// Rendering of an unavailable metric
pub const UNAVAILABLE_DISPLAY: &str = "-";
