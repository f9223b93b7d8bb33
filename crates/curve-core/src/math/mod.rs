//! # Reserve Math
//! 
//! Pure functions over reserve snapshots.

pub mod display;
pub mod reserves;

// Re-export commonly used functions
pub use display::*;
pub use reserves::*;
