//! # Reserve Model Properties
//! 
//! Property tests over the reserve model plus the reference launch scenario.

use curve_core::*;
use proptest::prelude::*;

#[test]
fn test_reference_curve_scenario() {
    let snapshot = ReserveSnapshot::new(35.0, 1_000_000_000.0, false);
    let params = CurveParams {
        initial_virtual_sol: 30.0,
        graduation_threshold_sol: 85.0,
        total_supply: 1_000_000_000.0,
    };

    let metrics = compute_trading_metrics(&snapshot, &params);

    assert_eq!(metrics.real_sol_reserves, 5.0);
    assert!((metrics.bonding_progress - 5.882352941176471).abs() < 1e-9);
    let price = metrics.price_sol.expect("price should be available");
    assert!((price - 3.5e-8).abs() < 1e-20);
    assert_eq!(metrics.price_display, "0.000000035");
    assert!(!metrics.is_graduated);
}

#[test]
fn test_division_by_zero_is_unavailable() {
    let no_sol = ReserveSnapshot::new(0.0, 100.0, false);
    let no_tokens = ReserveSnapshot::new(100.0, 0.0, false);

    assert_eq!(compute_price(&no_sol), None);
    assert_eq!(compute_price(&no_tokens), None);

    for snapshot in [no_sol, no_tokens] {
        let metrics = compute_trading_metrics(&snapshot, &CurveParams::default());
        assert!(metrics.bonding_progress.is_finite());
        assert!(metrics.real_sol_reserves.is_finite());
        assert!(metrics.market_cap_sol.is_none());
    }
}

proptest! {
    #[test]
    fn prop_price_strictly_increasing_in_sol(
        tokens in 1.0f64..1.0e12,
        sol in 1.0e-3f64..1.0e6,
        bump in 1.0e-3f64..1.0e6,
    ) {
        let lower = compute_price(&ReserveSnapshot::new(sol, tokens, false)).unwrap();
        let higher = compute_price(&ReserveSnapshot::new(sol + bump, tokens, false)).unwrap();
        prop_assert!(higher > lower);
    }

    #[test]
    fn prop_bonding_progress_in_range(
        virtual_sol in 0.0f64..1.0e7,
        initial in 0.0f64..1.0e3,
        threshold in 1.0e-6f64..1.0e6,
    ) {
        let snapshot = ReserveSnapshot::new(virtual_sol, 1.0e9, false);
        let progress = compute_bonding_progress(&snapshot, initial, threshold);
        prop_assert!((0.0..=100.0).contains(&progress));
    }

    #[test]
    fn prop_migrated_is_always_graduated(
        virtual_sol in 0.0f64..1.0e4,
        progress in -10.0f64..99.99,
    ) {
        let snapshot = ReserveSnapshot::new(virtual_sol, 1.0e9, true);
        prop_assert!(is_graduated(&snapshot, progress));
        let metrics = compute_trading_metrics(&snapshot, &CurveParams::default());
        prop_assert!(metrics.is_graduated);
    }

    #[test]
    fn prop_metrics_never_nan(
        virtual_sol in prop::num::f64::ANY,
        virtual_tokens in prop::num::f64::ANY,
    ) {
        let snapshot = ReserveSnapshot::new(virtual_sol, virtual_tokens, false);
        let metrics = compute_trading_metrics(&snapshot, &CurveParams::default());
        if let Some(price) = metrics.price_sol {
            prop_assert!(price.is_finite() && price > 0.0);
        }
        if let Some(market_cap) = metrics.market_cap_sol {
            prop_assert!(market_cap.is_finite());
        }
        prop_assert!(metrics.bonding_progress.is_finite());
        prop_assert!(metrics.real_sol_reserves.is_finite());
        prop_assert!(metrics.virtual_sol_reserves.is_finite());
        prop_assert!(metrics.virtual_token_reserves.is_finite());
    }
}
