//! # Reserve Model
//! 
//! Price, market cap, real reserves, bonding progress and graduation for a
//! constant-product curve with a virtual SOL baseline.
//! 
//! All ratios are `f64`. Any computation that would produce `NaN` or an
//! infinity yields `None` (unavailable) or `0.0` instead.

use crate::constants::MAX_BONDING_PROGRESS;
use crate::math::display::format_price;
use crate::types::snapshot::is_positive_finite;
use crate::types::{CurveParams, ReserveSnapshot, TradingMetrics};

/// Spot price in SOL per token: `virtual_sol / virtual_token`
pub fn compute_price(snapshot: &ReserveSnapshot) -> Option<f64> {
    if !snapshot.is_priceable() {
        return None;
    }
    let price = snapshot.virtual_sol_reserves / snapshot.virtual_token_reserves;
    is_positive_finite(price).then_some(price)
}

/// Market cap in SOL: price times total supply
pub fn compute_market_cap(snapshot: &ReserveSnapshot, total_supply: f64) -> Option<f64> {
    let market_cap = compute_price(snapshot)? * total_supply;
    market_cap.is_finite().then_some(market_cap)
}

/// SOL actually contributed by traders, never negative
pub fn compute_real_sol_reserves(snapshot: &ReserveSnapshot, initial_virtual_sol: f64) -> f64 {
    let real = snapshot.virtual_sol_reserves - initial_virtual_sol;
    if real.is_finite() {
        real.max(0.0)
    } else {
        0.0
    }
}

/// Percent of the graduation threshold collected, in `[0, 100]`
pub fn compute_bonding_progress(
    snapshot: &ReserveSnapshot,
    initial_virtual_sol: f64,
    graduation_threshold_sol: f64,
) -> f64 {
    if !is_positive_finite(graduation_threshold_sol) {
        return 0.0;
    }
    let real = compute_real_sol_reserves(snapshot, initial_virtual_sol);
    let progress = real / graduation_threshold_sol * MAX_BONDING_PROGRESS;
    if progress.is_finite() {
        progress.clamp(0.0, MAX_BONDING_PROGRESS)
    } else {
        0.0
    }
}

/// Migration flag wins over the computed threshold
pub fn is_graduated(snapshot: &ReserveSnapshot, bonding_progress: f64) -> bool {
    snapshot.is_migrated || bonding_progress >= MAX_BONDING_PROGRESS
}

/// All trading metrics for one snapshot
pub fn compute_trading_metrics(snapshot: &ReserveSnapshot, params: &CurveParams) -> TradingMetrics {
    let price_sol = compute_price(snapshot);
    let bonding_progress = compute_bonding_progress(
        snapshot,
        params.initial_virtual_sol,
        params.graduation_threshold_sol,
    );

    TradingMetrics {
        price_sol,
        price_display: format_price(price_sol),
        market_cap_sol: compute_market_cap(snapshot, params.total_supply),
        bonding_progress,
        real_sol_reserves: compute_real_sol_reserves(snapshot, params.initial_virtual_sol),
        virtual_sol_reserves: finite_or_zero(snapshot.virtual_sol_reserves),
        virtual_token_reserves: finite_or_zero(snapshot.virtual_token_reserves),
        is_graduated: is_graduated(snapshot, bonding_progress),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_price_basic() {
        let snapshot = ReserveSnapshot::new(30.0, 1_073_000_000.0, false);
        let price = compute_price(&snapshot).unwrap();
        assert!(approx_eq(price, 30.0 / 1_073_000_000.0));
    }

    #[test]
    fn test_price_zero_reserves_unavailable() {
        assert_eq!(compute_price(&ReserveSnapshot::new(0.0, 100.0, false)), None);
        assert_eq!(compute_price(&ReserveSnapshot::new(100.0, 0.0, false)), None);
        assert_eq!(compute_price(&ReserveSnapshot::new(-5.0, 100.0, false)), None);
    }

    #[test]
    fn test_price_overflowing_ratio_unavailable() {
        let snapshot = ReserveSnapshot::new(f64::MAX, f64::MIN_POSITIVE, false);
        assert_eq!(compute_price(&snapshot), None);
    }

    #[test]
    fn test_market_cap() {
        let snapshot = ReserveSnapshot::new(35.0, 1_000_000_000.0, false);
        let market_cap = compute_market_cap(&snapshot, 1_000_000_000.0).unwrap();
        assert!(approx_eq(market_cap, 35.0));
        assert_eq!(compute_market_cap(&ReserveSnapshot::new(0.0, 1.0, false), 1.0e9), None);
    }

    #[test]
    fn test_real_reserves_never_negative() {
        let snapshot = ReserveSnapshot::new(25.0, 1.0e9, false);
        assert_eq!(compute_real_sol_reserves(&snapshot, 30.0), 0.0);
        let snapshot = ReserveSnapshot::new(f64::NAN, 1.0e9, false);
        assert_eq!(compute_real_sol_reserves(&snapshot, 30.0), 0.0);
    }

    #[test]
    fn test_progress_clamps_at_hundred() {
        let snapshot = ReserveSnapshot::new(200.0, 1.0e8, false);
        assert_eq!(compute_bonding_progress(&snapshot, 30.0, 85.0), 100.0);
    }

    #[test]
    fn test_progress_with_bad_threshold_is_zero() {
        let snapshot = ReserveSnapshot::new(60.0, 1.0e9, false);
        assert_eq!(compute_bonding_progress(&snapshot, 30.0, 0.0), 0.0);
        assert_eq!(compute_bonding_progress(&snapshot, 30.0, -1.0), 0.0);
        assert_eq!(compute_bonding_progress(&snapshot, 30.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_graduation_from_threshold() {
        let snapshot = ReserveSnapshot::new(115.0, 2.8e8, false);
        let progress = compute_bonding_progress(&snapshot, 30.0, 85.0);
        assert!(is_graduated(&snapshot, progress));
    }

    #[test]
    fn test_migrated_flag_wins() {
        let snapshot = ReserveSnapshot::new(31.0, 1.0e9, true);
        assert!(is_graduated(&snapshot, 1.0));
    }

    #[test]
    fn test_unavailable_metrics_are_zeroed() {
        let snapshot = ReserveSnapshot::new(0.0, 0.0, false);
        let metrics = compute_trading_metrics(&snapshot, &CurveParams::default());
        assert!(!metrics.is_available());
        assert_eq!(metrics.market_cap_sol, None);
        assert_eq!(metrics.bonding_progress, 0.0);
        assert_eq!(metrics.real_sol_reserves, 0.0);
        assert_eq!(metrics.price_display, "-");
        assert!(!metrics.is_graduated);
    }
}
