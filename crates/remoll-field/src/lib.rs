//! Tabulated magnetic field maps for the remoll spectrometer.
//!
//! A [`FieldMap`] owns one cylindrical table loaded from a text file and
//! answers point queries by trilinear interpolation; a [`GlobalField`] sums
//! several maps. Both implement [`FieldSource`], the `(point) -> field`
//! contract an external stepper consumes.

pub mod field_map;
pub mod global_field;
pub mod reader;
pub mod writer;

pub use field_map::FieldMap;
pub use global_field::GlobalField;

use rayon::prelude::*;

/// Cartesian field (T) at a point `[x, y, z, t]` (m, time ignored).
pub trait FieldSource {
    fn field_value(&self, point: &[f64; 4]) -> [f64; 3];
}

/// Evaluate `source` at every point in parallel.
pub fn evaluate_many<S>(source: &S, points: &[[f64; 4]]) -> Vec<[f64; 3]>
where
    S: FieldSource + Sync + ?Sized,
{
    points.par_iter().map(|p| source.field_value(p)).collect()
}
