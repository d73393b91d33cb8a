//! field-probe: inspect and evaluate remoll field maps from the command line

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use remoll_field::{evaluate_many, FieldMap, FieldSource, GlobalField};
use remoll_types::config::FieldSetupConfig;
use remoll_types::grid::Coord;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "field-probe")]
#[command(about = "Inspect and evaluate tabulated magnetic field maps")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print grid metadata of one field map
    Info {
        /// Field map file (.gz is decompressed)
        map: PathBuf,
    },

    /// Print the field at one point
    Probe {
        #[command(flatten)]
        source: SourceArgs,

        /// x (m)
        #[arg(allow_hyphen_values = true)]
        x: f64,
        /// y (m)
        #[arg(allow_hyphen_values = true)]
        y: f64,
        /// z (m)
        #[arg(allow_hyphen_values = true)]
        z: f64,
    },

    /// Print the field along a line in z at fixed (x, y)
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f64,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y: f64,
        /// First z (m)
        #[arg(long, allow_hyphen_values = true)]
        z_from: f64,
        /// Last z (m)
        #[arg(long, allow_hyphen_values = true)]
        z_to: f64,
        /// Number of points
        #[arg(long, default_value = "101")]
        steps: usize,
    },
}

#[derive(clap::Args, Debug)]
struct SourceArgs {
    /// Field map files, summed
    #[arg(short, long = "map")]
    maps: Vec<PathBuf>,

    /// JSON field setup listing maps, scales and offsets
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scale applied to every map given with --map
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    scale: f64,

    /// Z offset (m) applied to every map given with --map
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    z_offset: f64,
}

fn build_field(args: &SourceArgs) -> Result<GlobalField> {
    let mut global = match &args.config {
        Some(path) => {
            let path = path.to_string_lossy();
            let config = FieldSetupConfig::from_file(&path)
                .with_context(|| format!("Failed to read field setup: {path}"))?;
            GlobalField::from_config(&config)?
        }
        None => GlobalField::new(),
    };
    for path in &args.maps {
        let map = FieldMap::load(path)
            .with_context(|| format!("Failed to load field map: {:?}", path))?;
        map.set_field_scale(args.scale);
        map.set_z_offset(args.z_offset);
        global.add_field(map)?;
    }
    if global.is_empty() {
        anyhow::bail!("No field maps given. Use --map or --config");
    }
    Ok(global)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    match args.command {
        Command::Info { map } => {
            let field = FieldMap::load(&map)
                .with_context(|| format!("Failed to load field map: {:?}", map))?;
            let grid = field.grid().context("Loaded map has no grid")?;
            println!("map:     {}", field.name());
            for c in Coord::ALL {
                let axis = grid.axis(c);
                let (min, max) = match c {
                    Coord::Phi => (axis.min().to_degrees(), axis.max().to_degrees()),
                    _ => (axis.min(), axis.max()),
                };
                println!("{:<8} {:>6} points  [{}, {}]", format!("{c}:"), axis.points(), min, max);
            }
            println!("xtants:  {}", grid.n_xtant());
        }
        Command::Probe { source, x, y, z } => {
            let field = build_field(&source)?;
            let b = field.field_value(&[x, y, z, 0.0]);
            println!("{:.6e} {:.6e} {:.6e}", b[0], b[1], b[2]);
        }
        Command::Scan {
            source,
            x,
            y,
            z_from,
            z_to,
            steps,
        } => {
            if steps < 2 {
                anyhow::bail!("--steps must be at least 2");
            }
            let field = build_field(&source)?;
            let dz = (z_to - z_from) / (steps - 1) as f64;
            let points: Vec<[f64; 4]> = (0..steps)
                .map(|i| [x, y, z_from + i as f64 * dz, 0.0])
                .collect();
            for (p, b) in points.iter().zip(evaluate_many(&field, &points)) {
                println!("{:.6} {:.6e} {:.6e} {:.6e}", p[2], b[0], b[1], b[2]);
            }
        }
    }

    Ok(())
}
