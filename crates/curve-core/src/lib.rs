//! # Curve Core - Bonding Curve Reserve Model
//! 
//! Pure functions that turn a bonding curve's reserve snapshot into the
//! numbers a trading UI shows:
//! 
//! - Spot price and market cap in SOL
//! - Real SOL contributed by traders
//! - Bonding progress towards graduation
//! - Graduation state
//! 
//! Nothing in this crate touches the network. Degenerate reserves produce the
//! "unavailable" sentinel (`None`) instead of `NaN` or `Infinity`.
//! 
//! ## Feature Flags
//! 
//! - `client`: Enables serde serialization for off-chain use

pub mod constants;
pub mod errors;
pub mod math;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{CurveError, CurveResult};
pub use math::*;
pub use types::*;
