use anyhow::anyhow;
use clap::Parser;
use nalgebra::Vector3;
use std::path::PathBuf;

use tau::config::load_thrusters;
use tau::envelope::solve_direction;
use tau::thruster::{ThrusterDefaults, layout_from_records};

/// Solve a single target direction and print the allocation breakdown.
#[derive(Parser, Debug)]
#[command(author, version, about = "Single-direction thrust query")]
struct Cli {
    /// Thruster layout: JSON/YAML/TOML file or a directory of TOML records
    #[arg(long, short = 't', default_value = "thrusters.json")]
    thrusters: PathBuf,

    /// Target direction as comma-separated components, e.g. 1,0,0
    #[arg(long, short = 'd')]
    direction: String,

    /// Maximum total current draw in amps
    #[arg(long, short = 'c', default_value_t = 22.0)]
    max_current: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let direction = parse_direction(&cli.direction)?;

    let records = load_thrusters(&cli.thrusters)?;
    let thrusters = layout_from_records(&records, &ThrusterDefaults::default())?;

    let solution = solve_direction(&thrusters, direction, cli.max_current)?;

    println!("=== Direction Query ===");
    println!(
        "Target direction : ({:.4}, {:.4}, {:.4})",
        direction.x, direction.y, direction.z
    );
    println!("Pre-derating     : {:.3} kgf", solution.raw_magnitude);
    println!(
        "Aggregate draw   : {:.3}·s² + {:.3}·s + {:.3} A",
        solution.quadratic.a, solution.quadratic.b, solution.quadratic.c
    );
    println!(
        "Draw at scale 1  : {:.2} A (budget {:.2} A)",
        solution.quadratic.amps_at(1.0),
        cli.max_current
    );
    println!("Derating scale   : {:.4}", solution.scale);
    println!("Achievable       : {:.3} kgf", solution.magnitude);
    println!();
    println!("Thruster   Alloc (kgf)   Derated (kgf)   Draw (A)");
    for (index, (thrust, thruster)) in solution.thrusts.iter().zip(&thrusters).enumerate() {
        let derated = thrust * solution.scale;
        println!(
            "{:>8}   {:>11.3}   {:>13.3}   {:>8.2}",
            index,
            thrust,
            derated,
            thruster.current_draw(derated)
        );
    }

    Ok(())
}

fn parse_direction(raw: &str) -> anyhow::Result<Vector3<f64>> {
    let components: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|err| anyhow!("invalid direction '{raw}': {err}"))?;
    if components.len() != 3 {
        return Err(anyhow!(
            "direction must have three components, got {}",
            components.len()
        ));
    }
    Ok(Vector3::new(components[0], components[1], components[2]))
}
