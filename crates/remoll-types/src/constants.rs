// ─────────────────────────────────────────────────────────────────────
// Remoll Field — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Units and tolerances shared by the parser, writer and query path.
//!
//! Lengths are meters, fields are Tesla and angles are radians everywhere
//! except on disk, where angles are written in degrees.

use std::f64::consts::PI;

/// Full azimuth (rad).
pub const TWO_PI: f64 = 2.0 * PI;

/// Degrees → radians.
pub const DEG: f64 = PI / 180.0;

/// Number of grid axes (R, Phi, Z).
pub const NDIM: usize = 3;

/// Minimum samples per axis; trilinear interpolation needs a bracket.
pub const MIN_AXIS_POINTS: usize = 2;

/// A body row may sit at most this fraction of a grid step away from
/// the grid line it is snapped to.
pub const GRID_SNAP_TOLERANCE: f64 = 0.25;

/// Allowed mismatch between the stored phi range and one sector,
/// as a fraction of the sector width.
pub const PHI_SECTOR_TOLERANCE: f64 = 1e-4;

/// Default field-scale multiplier.
pub const DEFAULT_FIELD_SCALE: f64 = 1.0;

/// Default longitudinal offset (m).
pub const DEFAULT_Z_OFFSET: f64 = 0.0;

/// Upper bound on cells per field map (three f64 components each, ~1.6 GB
/// at the limit). Headers declaring more are rejected before allocation.
pub const MAX_GRID_CELLS: usize = 1 << 26;
