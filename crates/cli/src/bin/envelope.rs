use anyhow::anyhow;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use tau::config::load_thrusters;
use tau::envelope::{EnvelopeRequest, rotational_envelope, sample_envelope};
use tau::export::envelope as export_envelope;
use tau::thruster::{ThrusterDefaults, layout_from_records};

/// Sweep the thrust envelope over a spherical grid and export the mesh.
#[derive(Parser, Debug)]
#[command(author, version, about = "Thrust-envelope sweep (CSV/JSON export)")]
struct Cli {
    /// Thruster layout: JSON/YAML/TOML file or a directory of TOML records
    #[arg(long, short = 't', default_value = "thrusters.json")]
    thrusters: PathBuf,

    /// Grid resolution; runtime is O(n^2) with respect to this!
    #[arg(long, short = 'r', default_value_t = 100)]
    resolution: usize,

    /// Maximum total current draw in amps
    #[arg(long, short = 'c', default_value_t = 22.0)]
    max_current: f64,

    /// Output CSV file (use '-' for stdout)
    #[arg(long, default_value = "artifacts/envelope.csv")]
    output: PathBuf,

    /// Also write a JSON sidecar with the full mesh
    #[arg(long)]
    json: Option<PathBuf>,

    /// Keep sweeping past failed samples, marking their cells invalid
    #[arg(long, default_value_t = false)]
    partial: bool,

    /// Skip the rotational (roll/pitch/yaw) capability table
    #[arg(long, default_value_t = false)]
    no_rotational: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.resolution < 2 {
        return Err(anyhow!("resolution must be at least 2"));
    }

    let records = load_thrusters(&cli.thrusters)?;
    let thrusters = layout_from_records(&records, &ThrusterDefaults::default())?;

    let request = EnvelopeRequest {
        thrusters: &thrusters,
        resolution: cli.resolution,
        max_current: cli.max_current,
        keep_partial: cli.partial,
    };
    let outcome = sample_envelope(&request)?;

    let mut writer = export_envelope::writer_for_path(&cli.output)?;
    export_envelope::write_header(writer.as_mut())?;
    export_envelope::write_mesh(writer.as_mut(), &outcome.mesh)?;
    writer.flush()?;

    if let Some(json_path) = &cli.json {
        let meta = export_envelope::Metadata {
            resolution: cli.resolution,
            max_current_amps: cli.max_current,
        };
        export_envelope::write_sidecar(json_path, &meta, &outcome.mesh)?;
    }

    println!("=== Envelope Sweep ===");
    println!("Thrusters     : {}", thrusters.len());
    println!(
        "Grid          : {} x {}",
        outcome.mesh.lon_count, outcome.mesh.colat_count
    );
    println!("Current budget: {:.1} A", cli.max_current);
    println!("Max thrust    : {:.3} kgf", outcome.mesh.max_magnitude);
    if let Some(direction) = strongest_direction(&outcome.mesh) {
        println!(
            "Strongest dir : ({:.4}, {:.4}, {:.4})",
            direction.0, direction.1, direction.2
        );
    }
    if !outcome.failures.is_empty() {
        println!("Failed samples: {}", outcome.failures.len());
        for failure in outcome.failures.iter().take(5) {
            println!(
                "  cell ({}, {}): {}",
                failure.lon_index, failure.colat_index, failure.error
            );
        }
    }

    if !cli.no_rotational {
        let rotational = rotational_envelope(&thrusters)?;
        println!("=== Rotational Capability (kgf*m) ===");
        println!(
            "Roll  (x) : +{:.3} / -{:.3}",
            rotational.roll.positive, rotational.roll.negative
        );
        println!(
            "Pitch (y) : +{:.3} / -{:.3}",
            rotational.pitch.positive, rotational.pitch.negative
        );
        println!(
            "Yaw   (z) : +{:.3} / -{:.3}",
            rotational.yaw.positive, rotational.yaw.negative
        );
    }

    Ok(())
}

/// Unit direction of the strongest valid cell, if any cell is valid.
fn strongest_direction(mesh: &tau::envelope::EnvelopeMesh) -> Option<(f64, f64, f64)> {
    let mut best: Option<(usize, usize)> = None;
    let mut best_magnitude = f64::NEG_INFINITY;
    for i in 0..mesh.lon_count {
        for j in 0..mesh.colat_count {
            let m = mesh.magnitude[mesh.index(i, j)];
            if m.is_finite() && m > best_magnitude {
                best_magnitude = m;
                best = Some((i, j));
            }
        }
    }
    best.map(|(i, j)| {
        let direction = tau::math::sphere::grid_direction(mesh.lons[i], mesh.colats[j]);
        (direction.x, direction.y, direction.z)
    })
}
