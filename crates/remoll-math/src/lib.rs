//! Mathematical primitives for the remoll field map engine.

pub mod cylindrical;
pub mod interp;
