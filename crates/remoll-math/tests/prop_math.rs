// ─────────────────────────────────────────────────────────────────────
// Remoll Field — Property-Based Tests (proptest) for remoll-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for remoll-math using proptest.
//!
//! Covers: axis bracketing, trilinear weights and blend,
//! cylindrical transforms, sector folding.

use ndarray::Array3;
use proptest::prelude::*;
use remoll_math::cylindrical::{rotate_to_cartesian, to_cylindrical, SectorFold};
use remoll_math::interp::{blend, bracket, cell_corners, trilinear_weights};
use remoll_types::constants::TWO_PI;
use remoll_types::grid::{Axis, Coord};
use std::f64::consts::PI;
use std::num::NonZeroUsize;

// ── Bracketing Properties ────────────────────────────────────────────

proptest! {
    /// Bracket index stays inside the last cell and reconstructs the value.
    #[test]
    fn bracket_reconstructs_value(
        n in 2usize..100,
        min in -5.0f64..5.0,
        span in 0.1f64..10.0,
        frac in 0.0f64..=1.0,
    ) {
        let axis = Axis::new(Coord::Z, n, min, min + span).unwrap();
        let v = min + frac * span;
        let (i, t) = bracket(&axis, v);

        prop_assert!(i <= n - 2, "index {} past last cell of {}", i, n);
        prop_assert!((0.0..=1.0).contains(&t));
        let rebuilt = axis.value(i) + t * axis.step();
        prop_assert!((rebuilt - v).abs() < 1e-9 * span.max(1.0),
            "rebuilt {} from ({}, {}), expected {}", rebuilt, i, t, v);
    }
}

// ── Trilinear Properties ─────────────────────────────────────────────

proptest! {
    /// Weights form a partition of unity and are non-negative.
    #[test]
    fn weights_partition_of_unity(
        tr in 0.0f64..=1.0,
        tp in 0.0f64..=1.0,
        tz in 0.0f64..=1.0,
    ) {
        let w = trilinear_weights([tr, tp, tz]);
        let sum: f64 = w.iter().sum();
        prop_assert!((sum - 1.0).abs() < 1e-12);
        prop_assert!(w.iter().all(|&x| x >= 0.0));
    }

    /// Blend is a convex combination of the 8 corners.
    #[test]
    fn blend_within_corner_bounds(
        c in proptest::array::uniform8(-50.0f64..50.0),
        tr in 0.0f64..=1.0,
        tp in 0.0f64..=1.0,
        tz in 0.0f64..=1.0,
    ) {
        let v = blend(&c, &trilinear_weights([tr, tp, tz]));
        let lo = c.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = c.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9,
            "blend {} outside [{}, {}]", v, lo, hi);
    }

    /// Trilinear interpolation of a constant array returns the constant.
    #[test]
    fn interp_constant_field(
        val in -100.0f64..100.0,
        r in 0.0f64..=2.0,
        phi in -0.4f64..=0.4,
        z in -1.0f64..=1.0,
    ) {
        let axes = [
            Axis::new(Coord::R, 9, 0.0, 2.0).unwrap(),
            Axis::new(Coord::Phi, 5, -0.4, 0.4).unwrap(),
            Axis::new(Coord::Z, 7, -1.0, 1.0).unwrap(),
        ];
        let field = Array3::from_elem((9, 5, 7), val);
        let (ir, tr) = bracket(&axes[0], r);
        let (ip, tp) = bracket(&axes[1], phi);
        let (iz, tz) = bracket(&axes[2], z);
        let result = blend(
            &cell_corners(&field.view(), [ir, ip, iz]),
            &trilinear_weights([tr, tp, tz]),
        );
        prop_assert!((result - val).abs() < 1e-10,
            "Constant field: interp = {}, expected {}", result, val);
    }
}

// ── Cylindrical / Folding Properties ─────────────────────────────────

proptest! {
    /// Cylindrical radius and azimuth reproduce the Cartesian point.
    #[test]
    fn cylindrical_roundtrip(x in -10.0f64..10.0, y in -10.0f64..10.0) {
        let [r, phi, _] = to_cylindrical(x, y, 0.0);
        prop_assert!((-PI..PI).contains(&phi));
        prop_assert!((r * phi.cos() - x).abs() < 1e-9);
        prop_assert!((r * phi.sin() - y).abs() < 1e-9);
    }

    /// Rotation back to Cartesian preserves the transverse magnitude.
    #[test]
    fn rotation_is_orthogonal(
        br in -5.0f64..5.0,
        bphi in -5.0f64..5.0,
        phi in -PI..PI,
    ) {
        let (bx, by) = rotate_to_cartesian(br, bphi, phi);
        prop_assert!((bx.hypot(by) - br.hypot(bphi)).abs() < 1e-12);
    }

    /// Folded angle lies in the stored sector and differs from the input
    /// by a whole number of sectors.
    #[test]
    fn fold_lands_in_stored_sector(n in 1usize..16, phi in -PI..PI) {
        let fold = SectorFold::new(NonZeroUsize::new(n).unwrap());
        let w = TWO_PI / n as f64;
        let (reduced, sector) = fold.fold(phi);

        prop_assert!(reduced >= -0.5 * w - 1e-12 && reduced <= 0.5 * w + 1e-12,
            "reduced {} outside [{}, {}]", reduced, -0.5 * w, 0.5 * w);
        prop_assert!((reduced + sector as f64 * w - phi).abs() < 1e-12);
    }

    /// Shifting by whole sectors does not change the folded angle.
    #[test]
    fn fold_is_periodic(n in 1usize..16, phi in -0.3f64..0.3, k in -3i64..3) {
        let fold = SectorFold::new(NonZeroUsize::new(n).unwrap());
        let w = TWO_PI / n as f64;
        let phi = phi / n as f64;
        let (a, _) = fold.fold(phi);
        let (b, _) = fold.fold(phi + k as f64 * w);
        prop_assert!((a - b).abs() < 1e-9, "fold({}) = {}, shifted = {}", phi, a, b);
    }
}
