// ─────────────────────────────────────────────────────────────────────
// Remoll Field — Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cylindrical grid metadata and dense field-table storage.
//!
//! The table is kept as three (R, Phi, Z) arrays, one per component
//! (B_r, B_phi, B_z).

use crate::constants::{MAX_GRID_CELLS, MIN_AXIS_POINTS, NDIM, PHI_SECTOR_TOLERANCE, TWO_PI};
use crate::error::{FieldMapError, FieldMapResult};
use ndarray::{Array3, ArrayView3};
use std::fmt;

/// Grid axis / field component selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coord {
    R = 0,
    Phi = 1,
    Z = 2,
}

impl Coord {
    pub const ALL: [Coord; NDIM] = [Coord::R, Coord::Phi, Coord::Z];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Coord::R => "r",
            Coord::Phi => "phi",
            Coord::Z => "z",
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One uniformly sampled axis. Phi bounds are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    points: usize,
    min: f64,
    max: f64,
    step: f64,
    inv_step: f64,
}

impl Axis {
    /// Validated axis: at least two points, finite bounds, `min < max`.
    pub fn new(coord: Coord, points: usize, min: f64, max: f64) -> FieldMapResult<Self> {
        if points < MIN_AXIS_POINTS {
            return Err(FieldMapError::ConfigError(format!(
                "{coord} axis needs at least {MIN_AXIS_POINTS} points, got {points}"
            )));
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(FieldMapError::ConfigError(format!(
                "{coord} axis bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min >= max {
            return Err(FieldMapError::ConfigError(format!(
                "{coord} axis requires min < max, got [{min}, {max}]"
            )));
        }
        let step = (max - min) / (points - 1) as f64;
        Ok(Axis {
            points,
            min,
            max,
            step,
            inv_step: 1.0 / step,
        })
    }

    #[inline]
    pub fn points(&self) -> usize {
        self.points
    }

    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Coordinate of grid line `i`.
    pub fn value(&self, i: usize) -> f64 {
        if i + 1 == self.points {
            self.max
        } else {
            self.min + i as f64 * self.step
        }
    }

    /// Inclusive bounds check.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    /// Fractional grid position `(v - min) / step`.
    #[inline]
    pub fn position(&self, v: f64) -> f64 {
        (v - self.min) * self.inv_step
    }
}

/// Grid geometry of one field map: three axes plus the sector count.
#[derive(Debug, Clone, PartialEq)]
pub struct CylGrid {
    axes: [Axis; NDIM],
    n_xtant: usize,
    phi_low: f64,
    sector_width: f64,
}

impl CylGrid {
    /// Validate axes against the sector count.
    ///
    /// The phi axis must span exactly one sector, `[-π/N, π/N]`, the
    /// radial axis may not start below zero, and the cell count may not
    /// exceed [`MAX_GRID_CELLS`].
    pub fn new(axes: [Axis; NDIM], n_xtant: usize) -> FieldMapResult<Self> {
        if n_xtant == 0 {
            return Err(FieldMapError::ConfigError(
                "sector count must be positive".to_string(),
            ));
        }
        let cells = axes
            .iter()
            .try_fold(1usize, |n, axis| n.checked_mul(axis.points()));
        if !matches!(cells, Some(n) if n <= MAX_GRID_CELLS) {
            return Err(FieldMapError::ConfigError(format!(
                "grid of {} x {} x {} points exceeds the limit of {MAX_GRID_CELLS} cells",
                axes[0].points(),
                axes[1].points(),
                axes[2].points(),
            )));
        }
        let r = &axes[Coord::R.index()];
        if r.min() < 0.0 {
            return Err(FieldMapError::ConfigError(format!(
                "r axis starts at negative radius {}",
                r.min()
            )));
        }

        let sector_width = TWO_PI / n_xtant as f64;
        let phi_low = -0.5 * sector_width;
        let phi = &axes[Coord::Phi.index()];
        let tol = PHI_SECTOR_TOLERANCE * sector_width;
        if (phi.min() - phi_low).abs() > tol || (phi.max() - (phi_low + sector_width)).abs() > tol
        {
            return Err(FieldMapError::ConfigError(format!(
                "phi range [{:.6}, {:.6}] deg does not span one of {} sectors [{:.6}, {:.6}] deg",
                phi.min().to_degrees(),
                phi.max().to_degrees(),
                n_xtant,
                phi_low.to_degrees(),
                (phi_low + sector_width).to_degrees(),
            )));
        }

        Ok(CylGrid {
            axes,
            n_xtant,
            phi_low,
            sector_width,
        })
    }

    /// Grid whose phi axis is exactly one sector wide.
    pub fn with_sector(
        n_xtant: usize,
        points: [usize; NDIM],
        r_range: (f64, f64),
        z_range: (f64, f64),
    ) -> FieldMapResult<Self> {
        if n_xtant == 0 {
            return Err(FieldMapError::ConfigError(
                "sector count must be positive".to_string(),
            ));
        }
        let half = 0.5 * TWO_PI / n_xtant as f64;
        let axes = [
            Axis::new(Coord::R, points[0], r_range.0, r_range.1)?,
            Axis::new(Coord::Phi, points[1], -half, half)?,
            Axis::new(Coord::Z, points[2], z_range.0, z_range.1)?,
        ];
        CylGrid::new(axes, n_xtant)
    }

    #[inline]
    pub fn axis(&self, c: Coord) -> &Axis {
        &self.axes[c.index()]
    }

    pub fn axes(&self) -> &[Axis; NDIM] {
        &self.axes
    }

    pub fn shape(&self) -> [usize; NDIM] {
        [
            self.axes[0].points(),
            self.axes[1].points(),
            self.axes[2].points(),
        ]
    }

    pub fn cell_count(&self) -> usize {
        self.shape().iter().product()
    }

    #[inline]
    pub fn n_xtant(&self) -> usize {
        self.n_xtant
    }

    /// Low edge of the stored sector (rad).
    #[inline]
    pub fn phi_low(&self) -> f64 {
        self.phi_low
    }

    /// Angular width of one sector (rad).
    #[inline]
    pub fn sector_width(&self) -> f64 {
        self.sector_width
    }
}

/// Dense storage for the three field components.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTable {
    shape: [usize; NDIM],
    data: [Array3<f64>; NDIM],
}

impl FieldTable {
    /// Zero-filled table of the given (R, Phi, Z) shape.
    ///
    /// Allocates unchecked; size tables from a validated [`CylGrid`].
    pub fn zeros(shape: [usize; NDIM]) -> Self {
        let dim = (shape[0], shape[1], shape[2]);
        FieldTable {
            shape,
            data: [Array3::zeros(dim), Array3::zeros(dim), Array3::zeros(dim)],
        }
    }

    /// Zero-filled table matching `grid`.
    pub fn for_grid(grid: &CylGrid) -> Self {
        FieldTable::zeros(grid.shape())
    }

    pub fn shape(&self) -> [usize; NDIM] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.data[0].is_empty()
    }

    /// Row-major linear index of cell `(ir, iphi, iz)`.
    #[inline]
    pub fn offset(&self, ir: usize, iphi: usize, iz: usize) -> usize {
        (ir * self.shape[1] + iphi) * self.shape[2] + iz
    }

    /// (B_r, B_phi, B_z) at a cell; `None` outside the table.
    pub fn get(&self, ir: usize, iphi: usize, iz: usize) -> Option<[f64; NDIM]> {
        if ir >= self.shape[0] || iphi >= self.shape[1] || iz >= self.shape[2] {
            return None;
        }
        let idx = [ir, iphi, iz];
        Some([self.data[0][idx], self.data[1][idx], self.data[2][idx]])
    }

    /// Store (B_r, B_phi, B_z) at a cell.
    pub fn set(&mut self, ir: usize, iphi: usize, iz: usize, b: [f64; NDIM]) -> FieldMapResult<()> {
        if ir >= self.shape[0] || iphi >= self.shape[1] || iz >= self.shape[2] {
            return Err(FieldMapError::ConfigError(format!(
                "cell ({ir}, {iphi}, {iz}) outside table of shape {:?}",
                self.shape
            )));
        }
        for (component, value) in self.data.iter_mut().zip(b) {
            component[[ir, iphi, iz]] = value;
        }
        Ok(())
    }

    /// Read-only (R, Phi, Z) view of one component.
    #[inline]
    pub fn view(&self, c: Coord) -> ArrayView3<'_, f64> {
        self.data[c.index()].view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_axis_step_and_endpoints() {
        let axis = Axis::new(Coord::R, 11, 0.0, 1.0).unwrap();
        assert!((axis.step() - 0.1).abs() < 1e-15);
        assert_eq!(axis.value(0), 0.0);
        assert_eq!(axis.value(10), 1.0);
        assert!((axis.position(0.35) - 3.5).abs() < 1e-12);
        assert!(axis.contains(1.0));
        assert!(!axis.contains(1.0 + 1e-12));
    }

    #[test]
    fn test_axis_rejects_degenerate() {
        assert!(matches!(
            Axis::new(Coord::Z, 1, 0.0, 1.0),
            Err(FieldMapError::ConfigError(_))
        ));
        assert!(matches!(
            Axis::new(Coord::Z, 5, 2.0, 2.0),
            Err(FieldMapError::ConfigError(_))
        ));
        assert!(Axis::new(Coord::Z, 5, 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_grid_septant_phi_range() {
        let grid = CylGrid::with_sector(7, [5, 9, 5], (0.0, 1.0), (-1.0, 1.0)).unwrap();
        assert_eq!(grid.n_xtant(), 7);
        assert!((grid.phi_low() + PI / 7.0).abs() < 1e-15);
        assert!((grid.sector_width() - 2.0 * PI / 7.0).abs() < 1e-15);
        assert_eq!(grid.cell_count(), 5 * 9 * 5);
    }

    #[test]
    fn test_grid_rejects_oversized_cell_count() {
        let huge = 1usize << 32;
        let axes = [
            Axis::new(Coord::R, huge, 0.0, 1.0).unwrap(),
            Axis::new(Coord::Phi, huge, -PI, PI).unwrap(),
            Axis::new(Coord::Z, 2, 0.0, 1.0).unwrap(),
        ];
        assert!(matches!(
            CylGrid::new(axes, 1),
            Err(FieldMapError::ConfigError(_))
        ));

        // No overflow, but far past the allocation limit.
        assert!(matches!(
            CylGrid::with_sector(1, [100_000, 100_000, 100_000], (0.0, 1.0), (0.0, 1.0)),
            Err(FieldMapError::ConfigError(_))
        ));
    }

    #[test]
    fn test_grid_rejects_wrong_phi_span() {
        let axes = [
            Axis::new(Coord::R, 3, 0.0, 1.0).unwrap(),
            Axis::new(Coord::Phi, 3, -PI / 7.0, PI / 7.0).unwrap(),
            Axis::new(Coord::Z, 3, 0.0, 1.0).unwrap(),
        ];
        assert!(CylGrid::new(axes, 7).is_ok());
        assert!(matches!(
            CylGrid::new(axes, 5),
            Err(FieldMapError::ConfigError(_))
        ));
        assert!(matches!(
            CylGrid::new(axes, 0),
            Err(FieldMapError::ConfigError(_))
        ));
    }

    #[test]
    fn test_table_offsets_are_row_major() {
        let mut table = FieldTable::zeros([3, 4, 5]);
        assert_eq!(table.offset(0, 1, 0), 5);
        assert_eq!(table.offset(1, 0, 0), 20);
        assert_eq!(table.offset(2, 3, 4), table.len() - 1);
        table.set(1, 2, 3, [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(table.get(1, 2, 3), Some([1.0, 2.0, 3.0]));
        assert_eq!(table.get(3, 0, 0), None);
        assert!(table.set(0, 4, 0, [0.0; 3]).is_err());

        let view = table.view(Coord::Phi);
        assert_eq!(view.shape(), &[3, 4, 5]);
        assert_eq!(view[[1, 2, 3]], 2.0);
    }
}
