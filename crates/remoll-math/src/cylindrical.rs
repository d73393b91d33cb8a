//! Cylindrical coordinates and azimuthal sector folding.
//!
//! Angles handled here live in `[-π, π)`. A map with `N` xtants stores a
//! single sector `[-π/N, π/N]`; any azimuth is folded into it by whole
//! sector rotations.

use remoll_types::constants::TWO_PI;
use remoll_types::grid::CylGrid;
use std::f64::consts::PI;
use std::num::NonZeroUsize;

/// Cartesian `(x, y, z)` → cylindrical `[r, phi, z]`, `phi ∈ [-π, π)`.
#[inline]
pub fn to_cylindrical(x: f64, y: f64, z: f64) -> [f64; 3] {
    let r = x.hypot(y);
    let mut phi = y.atan2(x);
    if phi >= PI {
        phi -= TWO_PI;
    }
    [r, phi, z]
}

/// Rotate a cylindrical `(b_r, b_phi)` pair at azimuth `phi` into `(b_x, b_y)`.
#[inline]
pub fn rotate_to_cartesian(b_r: f64, b_phi: f64, phi: f64) -> (f64, f64) {
    let (s, c) = phi.sin_cos();
    (b_r * c - b_phi * s, b_r * s + b_phi * c)
}

/// Fold of the full azimuth onto one stored sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorFold {
    n_xtant: usize,
    phi_low: f64,
    width: f64,
}

impl SectorFold {
    pub fn new(n_xtant: NonZeroUsize) -> Self {
        let width = TWO_PI / n_xtant.get() as f64;
        SectorFold {
            n_xtant: n_xtant.get(),
            phi_low: -0.5 * width,
            width,
        }
    }

    pub fn from_grid(grid: &CylGrid) -> Self {
        SectorFold {
            n_xtant: grid.n_xtant(),
            phi_low: grid.phi_low(),
            width: grid.sector_width(),
        }
    }

    pub fn n_xtant(&self) -> usize {
        self.n_xtant
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Sector containing `phi`, counted from the stored sector (index 0).
    #[inline]
    pub fn sector(&self, phi: f64) -> f64 {
        ((phi - self.phi_low) / self.width).floor()
    }

    /// Reduced angle in `[phi_low, phi_low + width)` and the sector index.
    #[inline]
    pub fn fold(&self, phi: f64) -> (f64, i64) {
        let sector = self.sector(phi);
        (phi - sector * self.width, sector as i64)
    }

    /// As [`SectorFold::fold`], except that an angle within `tol` of the
    /// closed stored sector `[phi_low, phi_low + width]` is returned as is.
    ///
    /// Keeps both edge columns of the stored table reachable: `+π/N` is
    /// not wrapped onto `-π/N`, and rounding just below `-π/N` is not
    /// wrapped onto `+π/N`.
    #[inline]
    pub fn fold_onto_stored(&self, phi: f64, tol: f64) -> (f64, i64) {
        if phi >= self.phi_low - tol && phi <= self.phi_low + self.width + tol {
            return (phi, 0);
        }
        self.fold(phi)
    }
}
