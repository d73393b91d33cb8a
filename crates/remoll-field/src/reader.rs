//! Field map text parser.
//!
//! Layout:
//! ```text
//! # comment   <Rpoints>   <Rmin>   <Rmax>
//! # comment   <Phipoints> <Phimin> <Phimax>
//! # comment   <Zpoints>   <Zmin>   <Zmax>
//! # comment   <Nxtants>
//! r  phi  z  br  bphi  bz
//! ```
//! Header values are the trailing tokens of each of the first four
//! non-blank lines. Body rows may come in any order; each row is placed
//! by snapping its `(r, phi, z)` to the nearest grid lines. Units on disk
//! are meters, degrees and Tesla.
//!
//! Every deviation is a hard error: a row outside the declared axes, a row
//! off the grid lines, a cell filled twice, or a cell never filled.

use flate2::read::GzDecoder;
use remoll_types::constants::{DEG, GRID_SNAP_TOLERANCE, NDIM};
use remoll_types::error::{FieldMapError, FieldMapResult};
use remoll_types::grid::{Axis, Coord, CylGrid, FieldTable};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Columns per body row: r, phi, z, br, bphi, bz.
const ROW_COLUMNS: usize = 6;

/// True when the file name marks a gzip-compressed map.
pub fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Open a map file, decompressing `.gz` transparently.
pub fn open_map(path: &Path) -> FieldMapResult<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Line source that tracks 1-based line numbers and reuses its buffer.
pub struct MapLines<R> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> MapLines<R> {
    pub fn new(reader: R) -> Self {
        MapLines {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Line number of the most recently returned line.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next non-blank line, trimmed, with its line number; `None` at end
    /// of input.
    pub fn next_line(&mut self) -> FieldMapResult<Option<(usize, &str)>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !self.buf.trim().is_empty() {
                return Ok(Some((self.line_no, self.buf.trim())));
            }
        }
    }
}

/// Last `count` whitespace tokens of a header line, with any leading `#`
/// stripped so `#51 0 1.2` and `# points 51 0 1.2` both parse.
fn trailing_tokens(line: &str, count: usize, line_no: usize) -> FieldMapResult<Vec<&str>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < count {
        return Err(FieldMapError::Header {
            line: line_no,
            message: format!("expected {count} values, found {}", tokens.len()),
        });
    }
    let skip = tokens.len() - count;
    Ok(tokens
        .into_iter()
        .skip(skip)
        .map(|t| t.trim_start_matches('#'))
        .collect())
}

fn parse_count(token: &str, what: &str, line_no: usize) -> FieldMapResult<usize> {
    let value: i64 = token.parse().map_err(|_| FieldMapError::Header {
        line: line_no,
        message: format!("{what} '{token}' is not an integer"),
    })?;
    if value <= 0 {
        return Err(FieldMapError::ConfigError(format!(
            "{what} must be positive, got {value} (line {line_no})"
        )));
    }
    Ok(value as usize)
}

fn parse_bound(token: &str, what: &str, line_no: usize) -> FieldMapResult<f64> {
    token.parse().map_err(|_| FieldMapError::Header {
        line: line_no,
        message: format!("{what} '{token}' is not a number"),
    })
}

fn read_axis<R: BufRead>(lines: &mut MapLines<R>, coord: Coord) -> FieldMapResult<Axis> {
    let Some((line_no, line)) = lines.next_line()? else {
        return Err(FieldMapError::Header {
            line: lines.line_no(),
            message: format!("missing {coord} axis line"),
        });
    };
    let tokens = trailing_tokens(line, 3, line_no)?;
    let points = parse_count(tokens[0], &format!("{coord} point count"), line_no)?;
    let mut min = parse_bound(tokens[1], &format!("{coord} min"), line_no)?;
    let mut max = parse_bound(tokens[2], &format!("{coord} max"), line_no)?;
    if coord == Coord::Phi {
        min *= DEG;
        max *= DEG;
    }
    Axis::new(coord, points, min, max)
}

/// Parse the four header lines into validated grid geometry.
pub fn read_header<R: BufRead>(lines: &mut MapLines<R>) -> FieldMapResult<CylGrid> {
    let axes = [
        read_axis(lines, Coord::R)?,
        read_axis(lines, Coord::Phi)?,
        read_axis(lines, Coord::Z)?,
    ];

    let Some((line_no, line)) = lines.next_line()? else {
        return Err(FieldMapError::Header {
            line: lines.line_no(),
            message: "missing xtant count line".to_string(),
        });
    };
    let tokens = trailing_tokens(line, 1, line_no)?;
    let n_xtant = parse_count(tokens[0], "xtant count", line_no)?;

    CylGrid::new(axes, n_xtant)
}

/// Nearest grid line for `value`, rejecting rows outside the axis or
/// between grid lines.
fn grid_index(axis: &Axis, coord: Coord, value: f64, line: usize) -> FieldMapResult<usize> {
    let f = axis.position(value);
    let nearest = f.round();
    if nearest < 0.0 || nearest > (axis.points() - 1) as f64 {
        return Err(FieldMapError::IndexOutOfRange {
            line,
            coord,
            index: nearest as i64,
            points: axis.points(),
        });
    }
    if (f - nearest).abs() > GRID_SNAP_TOLERANCE {
        return Err(FieldMapError::OffGrid { line, coord, value });
    }
    Ok(nearest as usize)
}

fn parse_row(line: &str, line_no: usize) -> FieldMapResult<[f64; ROW_COLUMNS]> {
    let mut values = [0.0f64; ROW_COLUMNS];
    let mut count = 0;
    for token in line.split_whitespace() {
        if count == ROW_COLUMNS {
            return Err(FieldMapError::Row {
                line: line_no,
                message: format!("more than {ROW_COLUMNS} columns"),
            });
        }
        values[count] = token.parse().map_err(|_| FieldMapError::Row {
            line: line_no,
            message: format!("'{token}' is not a number"),
        })?;
        count += 1;
    }
    if count < ROW_COLUMNS {
        return Err(FieldMapError::Row {
            line: line_no,
            message: format!("expected {ROW_COLUMNS} columns, found {count}"),
        });
    }
    if !values.iter().all(|v| v.is_finite()) {
        return Err(FieldMapError::Row {
            line: line_no,
            message: "non-finite value".to_string(),
        });
    }
    Ok(values)
}

/// Fill `table` from the body rows. Returns the number of rows read.
///
/// Lines starting with `#` inside the body are skipped.
pub fn read_body<R: BufRead>(
    lines: &mut MapLines<R>,
    grid: &CylGrid,
    table: &mut FieldTable,
) -> FieldMapResult<usize> {
    if table.shape() != grid.shape() {
        return Err(FieldMapError::ConfigError(format!(
            "table shape {:?} does not match grid shape {:?}",
            table.shape(),
            grid.shape()
        )));
    }
    let expected = grid.cell_count();
    let mut filled = vec![false; expected];
    let mut rows = 0;

    while let Some((line_no, line)) = lines.next_line()? {
        if line.starts_with('#') {
            continue;
        }
        let [r, phi_deg, z, b_r, b_phi, b_z] = parse_row(line, line_no)?;

        let mut idx = [0usize; NDIM];
        for (c, value) in [(Coord::R, r), (Coord::Phi, phi_deg * DEG), (Coord::Z, z)] {
            idx[c.index()] = grid_index(grid.axis(c), c, value, line_no)?;
        }
        let [ir, iphi, iz] = idx;

        let k = table.offset(ir, iphi, iz);
        if filled[k] {
            return Err(FieldMapError::DuplicateCell {
                line: line_no,
                ir,
                iphi,
                iz,
            });
        }
        filled[k] = true;
        table.set(ir, iphi, iz, [b_r, b_phi, b_z])?;
        rows += 1;
    }

    if rows != expected {
        return Err(FieldMapError::MissingCells {
            expected,
            filled: rows,
        });
    }
    Ok(rows)
}
