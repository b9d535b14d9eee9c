//! Property-based tests for collision detection and response.

use bevy::math::DVec3;
use proptest::prelude::*;

use super::*;
use crate::test_utils::assertions;

fn vec3(range: f64) -> impl Strategy<Value = DVec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn body(index: u32, position: DVec3, velocity: DVec3, radius: f64) -> CollisionBody {
    CollisionBody {
        handle: BodyHandle::new(index, 0),
        position,
        velocity: Some(velocity),
        radius,
        parent: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Swapping A and B flags the same pair with the same impact speed.
    #[test]
    fn prop_detection_is_symmetric(
        pa in vec3(5.0),
        pb in vec3(5.0),
        va in vec3(3.0),
        vb in vec3(3.0),
        ra in 0.1f64..3.0,
        rb in 0.1f64..3.0,
    ) {
        prop_assume!(pa != pb);
        let settings = CollisionSettings::default();
        let a = body(0, pa, va, ra);
        let b = body(1, pb, vb, rb);

        let ab = evaluate_pair(&a, &b, &settings);
        let ba = evaluate_pair(&b, &a, &settings);
        prop_assert_eq!(ab.is_some(), ba.is_some());

        if let (Some(ab), Some(ba)) = (ab, ba) {
            prop_assert!((ab.impact_speed - ba.impact_speed).abs() < 1e-9);
            prop_assert!((ab.contact_normal + ba.contact_normal).length() < 1e-9);
        }
    }

    /// Perfectly elastic impacts conserve momentum and kinetic energy.
    #[test]
    fn prop_elastic_impact_conserves_momentum(
        va in vec3(10.0),
        vb in vec3(10.0),
        ra in 0.1f64..5.0,
        rb in 0.1f64..5.0,
        direction in vec3(1.0),
    ) {
        prop_assume!(direction.length() > 1e-3);
        let normal = direction.normalize();
        let a = body(0, DVec3::ZERO, va, ra);
        let b = body(1, normal * (ra + rb) * 0.95, vb, rb);

        let response = compute_response(&a, &b, normal, 1.0).unwrap();
        let (ma, mb) = (mass_proxy(ra), mass_proxy(rb));

        let before = va * ma + vb * mb;
        let after = response.velocity_a * ma + response.velocity_b * mb;
        prop_assert!(
            (after - before).length() <= 1e-6 * before.length().max(1.0),
            "momentum drift {:?} -> {:?}", before, after
        );

        let energy_before = assertions::kinetic_energy(ma, va) + assertions::kinetic_energy(mb, vb);
        let energy_after = assertions::kinetic_energy(ma, response.velocity_a)
            + assertions::kinetic_energy(mb, response.velocity_b);
        prop_assert!((energy_after - energy_before).abs() <= 1e-6 * energy_before.max(1.0));
    }

    /// Approaching bodies separate at `e × v_n`.
    #[test]
    fn prop_restitution_scales_separation(
        va in vec3(10.0),
        vb in vec3(10.0),
        ra in 0.1f64..5.0,
        rb in 0.1f64..5.0,
        elasticity in 0.0f64..=1.0,
    ) {
        let normal = DVec3::X;
        let v_n = (va - vb).dot(normal);
        prop_assume!(v_n > 1e-6);

        let a = body(0, DVec3::ZERO, va, ra);
        let b = body(1, normal * (ra + rb), vb, rb);
        let response = compute_response(&a, &b, normal, elasticity).unwrap();

        let separation = (response.velocity_b - response.velocity_a).dot(normal);
        prop_assert!((separation - elasticity * v_n).abs() < 1e-9 * v_n.max(1.0));

        // Tangential components are untouched
        let tangential = |v: DVec3| v - normal * v.dot(normal);
        prop_assert!((tangential(response.velocity_a) - tangential(va)).length() < 1e-9);
        prop_assert!((tangential(response.velocity_b) - tangential(vb)).length() < 1e-9);
    }

    /// A touching pair polled repeatedly inside one window fires once.
    #[test]
    fn prop_cooldown_fires_once_per_window(
        steps in proptest::collection::vec(1.0f64..200.0, 1..40),
    ) {
        let settings = CollisionSettings::default();
        let bodies = [
            body(0, DVec3::ZERO, DVec3::X, 1.0),
            body(1, DVec3::new(1.5, 0.0, 0.0), DVec3::ZERO, 1.0),
        ];
        let mut detector = CollisionDetector::new();

        let mut now = 0.0;
        let mut fired = detector.detect(&bodies, &settings, now).len();
        for dt in steps {
            now += dt;
            if now >= settings.cooldown_ms {
                break;
            }
            fired += detector.detect(&bodies, &settings, now).len();
        }
        prop_assert_eq!(fired, 1);
    }
}
