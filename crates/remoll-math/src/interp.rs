//! Trilinear interpolation on uniformly sampled (R, Phi, Z) grids.
//!
//! Corners are numbered `k = 4*dr + 2*dphi + dz` with `dr, dphi, dz ∈ {0, 1}`.
//! The weights of a point depend only on its fractional offsets, so one set
//! of weights serves all three field components of a cell.

use ndarray::ArrayView3;
use remoll_types::grid::Axis;

/// Bracketing grid index and fractional offset of `v` on `axis`.
///
/// Returns `(i, t)` with `0 <= i <= points - 2` and `t ∈ [0, 1]`, so the
/// upper bound lands on `(points - 2, 1.0)` instead of running off the
/// end. Caller is responsible for the domain check.
#[inline]
pub fn bracket(axis: &Axis, v: f64) -> (usize, f64) {
    let f = axis.position(v).max(0.0);
    let i = (f.floor() as usize).min(axis.points() - 2);
    let t = (f - i as f64).clamp(0.0, 1.0);
    (i, t)
}

/// Weights of the 8 cell corners for fractional offsets `t = [tr, tphi, tz]`.
#[inline]
pub fn trilinear_weights(t: [f64; 3]) -> [f64; 8] {
    let [tr, tp, tz] = t;
    let (ur, up, uz) = (1.0 - tr, 1.0 - tp, 1.0 - tz);
    [
        ur * up * uz,
        ur * up * tz,
        ur * tp * uz,
        ur * tp * tz,
        tr * up * uz,
        tr * up * tz,
        tr * tp * uz,
        tr * tp * tz,
    ]
}

/// Weighted sum of 8 corner samples.
#[inline]
pub fn blend(corners: &[f64; 8], weights: &[f64; 8]) -> f64 {
    corners.iter().zip(weights).map(|(c, w)| c * w).sum()
}

/// The 8 samples of the cell whose low corner is `cell = [ir, iphi, iz]`.
///
/// `cell` must be a bracket result, i.e. at most `shape - 2` on every axis.
#[inline]
pub fn cell_corners(field: &ArrayView3<'_, f64>, cell: [usize; 3]) -> [f64; 8] {
    let [ir, ip, iz] = cell;
    [
        field[[ir, ip, iz]],
        field[[ir, ip, iz + 1]],
        field[[ir, ip + 1, iz]],
        field[[ir, ip + 1, iz + 1]],
        field[[ir + 1, ip, iz]],
        field[[ir + 1, ip, iz + 1]],
        field[[ir + 1, ip + 1, iz]],
        field[[ir + 1, ip + 1, iz + 1]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use remoll_types::grid::Coord;

    fn unit_axes(n: usize) -> [Axis; 3] {
        [
            Axis::new(Coord::R, n, 0.0, (n - 1) as f64).unwrap(),
            Axis::new(Coord::Phi, n, 0.0, (n - 1) as f64).unwrap(),
            Axis::new(Coord::Z, n, 0.0, (n - 1) as f64).unwrap(),
        ]
    }

    #[test]
    fn test_bracket_interior_and_edges() {
        let axis = Axis::new(Coord::R, 5, 0.0, 4.0).unwrap();
        assert_eq!(bracket(&axis, 0.0), (0, 0.0));
        let (i, t) = bracket(&axis, 2.25);
        assert_eq!(i, 2);
        assert!((t - 0.25).abs() < 1e-12);
        // Upper edge stays inside the last cell.
        assert_eq!(bracket(&axis, 4.0), (3, 1.0));
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = trilinear_weights([0.3, 0.7, 0.1]);
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-14);
        assert!(w.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn test_corners_at_unit_offsets() {
        let c = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        for k in 0..8 {
            let t = [((k >> 2) & 1) as f64, ((k >> 1) & 1) as f64, (k & 1) as f64];
            assert_eq!(blend(&c, &trilinear_weights(t)), c[k]);
        }
    }

    #[test]
    fn test_cell_corners_order() {
        let field = Array3::from_shape_fn((3, 4, 5), |(i, j, k)| (100 * i + 10 * j + k) as f64);
        let corners = cell_corners(&field.view(), [1, 2, 3]);
        assert_eq!(corners[0], 123.0);
        assert_eq!(corners[1], 124.0);
        assert_eq!(corners[2], 133.0);
        assert_eq!(corners[4], 223.0);
        assert_eq!(corners[7], 234.0);
    }

    #[test]
    fn test_linear_field_reproduced() {
        let ax = unit_axes(6);
        // f = 2r - phi + 0.5z is reproduced exactly by trilinear interpolation.
        let field = Array3::from_shape_fn((6, 6, 6), |(i, j, k)| {
            2.0 * i as f64 - j as f64 + 0.5 * k as f64
        });
        let p = [1.3, 4.2, 2.9];
        let (ir, tr) = bracket(&ax[0], p[0]);
        let (ip, tp) = bracket(&ax[1], p[1]);
        let (iz, tz) = bracket(&ax[2], p[2]);
        let val = blend(
            &cell_corners(&field.view(), [ir, ip, iz]),
            &trilinear_weights([tr, tp, tz]),
        );
        let expected = 2.0 * 1.3 - 4.2 + 0.5 * 2.9;
        assert!((val - expected).abs() < 1e-12, "val = {val}, expected {expected}");
    }
}
