//! Property-based tests for orbit geometry and anomaly advancement.

use std::f64::consts::TAU;

use proptest::prelude::*;

use super::*;
use crate::catalog::kepler_speed_ratio;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Derived axes are real, positive and ordered for every valid ellipse.
    #[test]
    fn prop_ellipse_axes_valid(
        a in 0.1f64..1000.0,
        e in 0.0f64..0.999,
        incl in -180.0f64..180.0,
    ) {
        let ellipse = Ellipse::new(a, e, incl);
        prop_assert!(ellipse.semi_minor_axis.is_finite());
        prop_assert!(ellipse.semi_minor_axis > 0.0);
        prop_assert!(ellipse.semi_minor_axis <= a);
        prop_assert!(ellipse.focal_distance < a);
    }

    /// Anomaly stays in [0, 2π) for any forward advance sequence.
    #[test]
    fn prop_anomaly_bounded(
        start in 0.0f64..TAU,
        steps in proptest::collection::vec(0.0f64..10.0, 1..200),
    ) {
        let mut theta = start;
        for delta in steps {
            theta = advance_anomaly(theta, delta);
            prop_assert!((0.0..TAU).contains(&theta), "anomaly {} escaped", theta);
        }
    }

    /// Crossing the wrap point does not make the body jump.
    #[test]
    fn prop_position_continuous_across_wrap(
        a in 1.0f64..500.0,
        e in 0.0f64..0.9,
        incl in 0.0f64..90.0,
        delta in 1e-6f64..1e-3,
    ) {
        let orbit = OrbitKind::elliptical(a, e, incl);
        let before = orbit.local_position(TAU - delta);
        let after = orbit.local_position(advance_anomaly(TAU - delta, 2.0 * delta));

        // Arc length over 2δ is at most a·2δ
        prop_assert!(
            (after - before).length() <= a * 2.0 * delta * 1.01,
            "jump of {} across wrap", (after - before).length()
        );
    }

    /// Orbit positions stay between periapsis and apoapsis.
    #[test]
    fn prop_focus_distance_in_range(
        a in 1.0f64..500.0,
        e in 0.0f64..0.99,
        incl in 0.0f64..180.0,
        theta in 0.0f64..TAU,
    ) {
        let ellipse = Ellipse::new(a, e, incl);
        let r = ellipse.local_position(theta).length();
        prop_assert!(r >= ellipse.periapsis() - 1e-9 * a);
        prop_assert!(r <= ellipse.apoapsis() + 1e-9 * a);
    }

    /// Calibrated speed ratio matches √(a_ref / a).
    #[test]
    fn prop_kepler_ratio(
        a_ref in 0.1f64..1000.0,
        a in 0.1f64..1000.0,
    ) {
        let ratio = kepler_speed_ratio(a_ref, a);
        prop_assert!((ratio - (a_ref / a).sqrt()).abs() <= 1e-9 * ratio.max(1.0));
        prop_assert!((ratio * ratio * a - a_ref).abs() <= 1e-9 * a_ref.max(1.0));
    }
}
