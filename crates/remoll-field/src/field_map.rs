//! One tabulated magnetic field map.
//!
//! Trilinear interpolation in cylindrical coordinates (r, phi, z) over a
//! table that stores a single azimuthal sector. Queries at any azimuth are
//! folded into the stored sector for the lookup, then rotated back to the
//! true azimuth:
//!   B_x = B_r cos(phi) - B_phi sin(phi)
//!   B_y = B_r sin(phi) + B_phi cos(phi)
//!
//! Loading needs `&mut self`; once loaded the map is read-only apart from
//! the field scale and z-offset, which are atomics so they can be changed
//! between queries issued from several threads.

use crate::reader::{open_map, read_body, read_header, MapLines};
use crate::FieldSource;
use remoll_math::cylindrical::{rotate_to_cartesian, to_cylindrical, SectorFold};
use remoll_math::interp::{blend, bracket, cell_corners, trilinear_weights};
use remoll_types::config::MagnetConfig;
use remoll_types::constants::{DEFAULT_FIELD_SCALE, DEFAULT_Z_OFFSET, PHI_SECTOR_TOLERANCE};
use remoll_types::error::{FieldMapError, FieldMapResult};
use remoll_types::grid::{Coord, CylGrid, FieldTable};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

/// Returned outside the table and by maps that are not loaded.
const NO_FIELD: [f64; 3] = [0.0; 3];

/// f64 stored as its bit pattern.
#[derive(Debug)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(v: f64) -> Self {
        AtomicF64(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Release);
    }
}

/// Field map loaded from one data file.
#[derive(Debug)]
pub struct FieldMap {
    name: String,
    path: PathBuf,
    grid: Option<CylGrid>,
    table: Option<FieldTable>,
    field_scale: AtomicF64,
    z_offset: AtomicF64,
    init: bool,
}

impl FieldMap {
    /// Unloaded map bound to `path`. Call [`FieldMap::read_field_map`] next.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        FieldMap {
            name: path.to_string_lossy().into_owned(),
            path,
            grid: None,
            table: None,
            field_scale: AtomicF64::new(DEFAULT_FIELD_SCALE),
            z_offset: AtomicF64::new(DEFAULT_Z_OFFSET),
            init: false,
        }
    }

    /// Construct and load in one step.
    pub fn load(path: impl AsRef<Path>) -> FieldMapResult<Self> {
        let mut map = FieldMap::new(path);
        map.read_field_map()?;
        Ok(map)
    }

    /// Load the map named in `config` and apply its scale and offset.
    pub fn from_config(config: &MagnetConfig) -> FieldMapResult<Self> {
        let map = FieldMap::load(&config.file)?;
        map.set_field_scale(config.scale);
        map.set_z_offset(config.z_offset);
        Ok(map)
    }

    /// Initialized map over an in-memory table.
    pub fn from_table(
        name: impl Into<String>,
        grid: CylGrid,
        table: FieldTable,
    ) -> FieldMapResult<Self> {
        if table.shape() != grid.shape() {
            return Err(FieldMapError::ConfigError(format!(
                "table shape {:?} does not match grid shape {:?}",
                table.shape(),
                grid.shape()
            )));
        }
        let name = name.into();
        Ok(FieldMap {
            path: PathBuf::from(&name),
            name,
            grid: Some(grid),
            table: Some(table),
            field_scale: AtomicF64::new(DEFAULT_FIELD_SCALE),
            z_offset: AtomicF64::new(DEFAULT_Z_OFFSET),
            init: true,
        })
    }

    /// Allocate zeroed storage for the three components.
    ///
    /// Requires the axis counts from the header. Any previous table is
    /// discarded and the map is marked uninitialized until filled.
    pub fn initialize_grid(&mut self) -> FieldMapResult<()> {
        let Some(grid) = &self.grid else {
            return Err(FieldMapError::NotInitialized(format!(
                "{}: axis point counts unknown, header not parsed",
                self.name
            )));
        };
        self.table = Some(FieldTable::for_grid(grid));
        self.init = false;
        Ok(())
    }

    /// Parse the map file: header, storage allocation, body rows.
    ///
    /// On failure the error is logged once, the map is left uninitialized
    /// and every query returns zero field.
    pub fn read_field_map(&mut self) -> FieldMapResult<()> {
        let result = open_map(&self.path).and_then(|reader| self.fill_from(reader));
        self.finish_load(result)
    }

    /// As [`FieldMap::read_field_map`], reading from an open source.
    pub fn read_field_map_from<R: BufRead>(&mut self, reader: R) -> FieldMapResult<()> {
        let result = self.fill_from(reader);
        self.finish_load(result)
    }

    fn fill_from<R: BufRead>(&mut self, reader: R) -> FieldMapResult<usize> {
        self.init = false;
        self.grid = None;
        self.table = None;

        let mut lines = MapLines::new(reader);
        let grid = read_header(&mut lines)?;
        debug!(
            map = %self.name,
            r = ?grid.axis(Coord::R),
            phi = ?grid.axis(Coord::Phi),
            z = ?grid.axis(Coord::Z),
            xtants = grid.n_xtant(),
            "parsed field map header"
        );
        self.grid = Some(grid);
        self.initialize_grid()?;

        match (&self.grid, &mut self.table) {
            (Some(grid), Some(table)) => read_body(&mut lines, grid, table),
            _ => Err(FieldMapError::NotInitialized(format!(
                "{}: storage missing after allocation",
                self.name
            ))),
        }
    }

    fn finish_load(&mut self, result: FieldMapResult<usize>) -> FieldMapResult<()> {
        match result {
            Ok(rows) => {
                self.init = true;
                if let Some(grid) = &self.grid {
                    let [nr, nphi, nz] = grid.shape();
                    info!(
                        map = %self.name,
                        rows,
                        nr,
                        nphi,
                        nz,
                        xtants = grid.n_xtant(),
                        "field map loaded"
                    );
                }
                Ok(())
            }
            Err(e) => {
                self.init = false;
                self.grid = None;
                self.table = None;
                error!(map = %self.name, "failed to load field map: {e}");
                Err(e)
            }
        }
    }

    /// Dimensionless multiplier applied to every returned component.
    pub fn set_field_scale(&self, scale: f64) {
        if !scale.is_finite() {
            warn!(map = %self.name, scale, "ignoring non-finite field scale");
            return;
        }
        self.field_scale.store(scale);
    }

    /// Longitudinal position of the map (m): the value at `z` becomes the
    /// unshifted value at `z - offset`.
    pub fn set_z_offset(&self, offset: f64) {
        if !offset.is_finite() {
            warn!(map = %self.name, offset, "ignoring non-finite z offset");
            return;
        }
        self.z_offset.store(offset);
    }

    pub fn field_scale(&self) -> f64 {
        self.field_scale.load()
    }

    pub fn z_offset(&self) -> f64 {
        self.z_offset.load()
    }

    pub fn is_init(&self) -> bool {
        self.init
    }

    /// Map identifier (the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> Option<&CylGrid> {
        self.grid.as_ref()
    }

    pub fn table(&self) -> Option<&FieldTable> {
        self.table.as_ref()
    }

    /// Field at `point = [x, y, z, t]` written into `field` as (B_x, B_y, B_z).
    pub fn get_field_value(&self, point: &[f64; 4], field: &mut [f64; 3]) {
        *field = self.field_at(point);
    }

    /// Field at `point = [x, y, z, t]` (m) as Cartesian (B_x, B_y, B_z) (T).
    ///
    /// Zero outside the tabulated domain and for maps that are not loaded.
    #[inline]
    pub fn field_at(&self, point: &[f64; 4]) -> [f64; 3] {
        if !self.init {
            return NO_FIELD;
        }
        let (Some(grid), Some(table)) = (&self.grid, &self.table) else {
            return NO_FIELD;
        };

        let z = point[2] - self.z_offset.load();
        let [r, phi, z] = to_cylindrical(point[0], point[1], z);

        let r_axis = grid.axis(Coord::R);
        let z_axis = grid.axis(Coord::Z);
        if !(r_axis.contains(r) && z_axis.contains(z)) {
            return NO_FIELD;
        }

        let phi_axis = grid.axis(Coord::Phi);
        let tol = PHI_SECTOR_TOLERANCE * grid.sector_width();
        let (local_phi, _) = SectorFold::from_grid(grid).fold_onto_stored(phi, tol);
        if !(local_phi >= phi_axis.min() - tol && local_phi <= phi_axis.max() + tol) {
            return NO_FIELD;
        }

        let (ir, tr) = bracket(r_axis, r);
        let (ip, tp) = bracket(phi_axis, local_phi);
        let (iz, tz) = bracket(z_axis, z);
        let weights = trilinear_weights([tr, tp, tz]);
        let [b_r, b_phi, b_z] =
            Coord::ALL.map(|c| blend(&cell_corners(&table.view(c), [ir, ip, iz]), &weights));

        // Rotate with the true azimuth, not the folded one.
        let (b_x, b_y) = rotate_to_cartesian(b_r, b_phi, phi);
        let scale = self.field_scale.load();
        [b_x * scale, b_y * scale, b_z * scale]
    }
}

impl FieldSource for FieldMap {
    fn field_value(&self, point: &[f64; 4]) -> [f64; 3] {
        self.field_at(point)
    }
}
