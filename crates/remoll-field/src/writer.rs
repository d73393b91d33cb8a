//! Field map writer, in the layout [`crate::reader`] parses.
//!
//! Angles are written in degrees. Files ending in `.gz` are compressed.

use crate::reader::is_gzip;
use flate2::write::GzEncoder;
use flate2::Compression;
use remoll_types::error::FieldMapResult;
use remoll_types::grid::{Coord, CylGrid, FieldTable};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sample `f(r, phi, z) -> [b_r, b_phi, b_z]` on every grid point.
pub fn tabulate<F>(grid: &CylGrid, f: F) -> FieldMapResult<FieldTable>
where
    F: Fn(f64, f64, f64) -> [f64; 3],
{
    let mut table = FieldTable::zeros(grid.shape());
    let [nr, nphi, nz] = grid.shape();
    for ir in 0..nr {
        let r = grid.axis(Coord::R).value(ir);
        for ip in 0..nphi {
            let phi = grid.axis(Coord::Phi).value(ip);
            for iz in 0..nz {
                let z = grid.axis(Coord::Z).value(iz);
                table.set(ir, ip, iz, f(r, phi, z))?;
            }
        }
    }
    Ok(table)
}

/// Write header and one row per cell.
pub fn write_field_map<W: Write>(
    mut out: W,
    grid: &CylGrid,
    table: &FieldTable,
) -> FieldMapResult<()> {
    let r = grid.axis(Coord::R);
    let phi = grid.axis(Coord::Phi);
    let z = grid.axis(Coord::Z);
    writeln!(out, "# Rpoints   rmin   rmax     {} {} {}", r.points(), r.min(), r.max())?;
    writeln!(
        out,
        "# Phipoints phimin phimax {} {} {}",
        phi.points(),
        phi.min().to_degrees(),
        phi.max().to_degrees()
    )?;
    writeln!(out, "# Zpoints   zmin   zmax     {} {} {}", z.points(), z.min(), z.max())?;
    writeln!(out, "# xtants                    {}", grid.n_xtant())?;

    let [nr, nphi, nz] = grid.shape();
    for ir in 0..nr {
        for ip in 0..nphi {
            for iz in 0..nz {
                let Some([b_r, b_phi, b_z]) = table.get(ir, ip, iz) else {
                    continue;
                };
                writeln!(
                    out,
                    "{} {} {} {} {} {}",
                    r.value(ir),
                    phi.value(ip).to_degrees(),
                    z.value(iz),
                    b_r,
                    b_phi,
                    b_z
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Write a map file, gzip-compressed when `path` ends in `.gz`.
pub fn save_field_map(path: &Path, grid: &CylGrid, table: &FieldTable) -> FieldMapResult<()> {
    let file = BufWriter::new(File::create(path)?);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_field_map(&mut encoder, grid, table)?;
        encoder.finish()?.flush()?;
    } else {
        write_field_map(file, grid, table)?;
    }
    Ok(())
}
