use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use glider_sim::dynamics::SimConfig;
use glider_sim::error::SimError;
use glider_sim::io::{self, FlightSummary, TableOptions};
use glider_sim::sim::{self, AltitudeDetector, EventDetector, Trajectory};
use glider_sim::vehicle::{presets, Scenario, ScenarioConfig};

const RULE: &str = "  ──────────────────────────────────────────────────────────────────";

/// Fly a glider scenario, print a flight report and write a trajectory
/// table with a JSON summary next to it.
#[derive(Parser, Debug)]
#[command(name = "glider-sim", version, about)]
#[command(after_help = format!("Presets: {}", presets::NAMES.join(", ")))]
struct Args {
    /// Preset name or path of a JSON scenario file
    #[arg(default_value = "glide")]
    scenario: String,

    /// Trajectory table path; the summary is written with a .json extension
    #[arg(default_value = "trajectory.tsv")]
    output: PathBuf,

    /// Report when the flight crosses this altitude (m), either way.
    /// May be given more than once.
    #[arg(long = "crossing", value_name = "ALTITUDE")]
    crossings: Vec<f64>,
}

/// A preset name or the path of a JSON scenario file.
fn load(arg: &str) -> Result<(Scenario, SimConfig), SimError> {
    if let Some(preset) = presets::by_name(arg) {
        return Ok((preset?, SimConfig::default()));
    }
    let config = ScenarioConfig::from_file(arg)?;
    Ok((config.to_scenario()?, config.sim_config()))
}

fn crossing_detectors(altitudes: &[f64]) -> Vec<Box<dyn EventDetector>> {
    altitudes
        .iter()
        .flat_map(|&alt| {
            [true, false].map(|ascending| {
                Box::new(AltitudeDetector::new(alt, ascending)) as Box<dyn EventDetector>
            })
        })
        .collect()
}

fn main() -> ExitCode {
    let args = Args::parse();
    let output = &args.output;

    let (scenario, config) = match load(&args.scenario) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("presets: {}", presets::NAMES.join(", "));
            return ExitCode::FAILURE;
        }
    };

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    let mut trajectory = match sim::simulate(&scenario, &config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    trajectory.detect(&mut crossing_detectors(&args.crossings));

    report(&scenario, &config, &trajectory);

    // -----------------------------------------------------------------------
    // Write results
    // -----------------------------------------------------------------------
    let options = TableOptions {
        every: (0.1 / config.dt).round().max(1.0) as usize,
        ..TableOptions::default()
    };
    if let Err(e) = io::write_trajectory_file(output, &trajectory.states, &options) {
        eprintln!("failed to write {}: {e}", output.display());
        return ExitCode::FAILURE;
    }
    println!("  Trajectory written to {}", output.display());

    let summary_path = output.with_extension("json");
    if let Some(summary) =
        FlightSummary::from_trajectory(&scenario, &trajectory, &config.constants.atmosphere)
    {
        if let Err(e) = io::write_summary_file(&summary_path, &summary) {
            eprintln!("failed to write {}: {e}", summary_path.display());
            return ExitCode::FAILURE;
        }
        println!("  Summary written to {}", summary_path.display());
    }
    println!();

    ExitCode::SUCCESS
}

fn report(scenario: &Scenario, config: &SimConfig, trajectory: &Trajectory) {
    let atm = &config.constants.atmosphere;
    let (Some(first), Some(last)) = (trajectory.initial(), trajectory.last()) else {
        return;
    };

    println!();
    println!("====================================================================");
    println!("  GLIDER FLIGHT SIMULATION — {}", scenario.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle");
    println!("{RULE}");
    let a = &scenario.airframe;
    println!(
        "  Airframe mass: {:>8.3} kg    Launch mass:  {:>8.3} kg",
        a.mass,
        scenario.launch_mass()
    );
    println!(
        "  Wing area:     {:>8.4} m^2   Chord:        {:>8.3} m",
        a.wing_area, a.chord
    );
    println!(
        "  Jx:            {:>8.3}       Jz:           {:>8.3}",
        a.jx, a.jz
    );
    println!("  Propulsion:    {}", scenario.propulsion.kind());
    println!();

    println!("  Flight Events");
    println!("{RULE}");
    if trajectory.events.is_empty() {
        println!("  (none)");
    }
    for e in &trajectory.events {
        println!(
            "  {:<28} t={:>7.2}s   alt={:>8.0}m   vel={:>6.1}m/s",
            e.kind.to_string(),
            e.time,
            e.state.altitude(),
            e.state.velocity()
        );
    }
    println!();

    let highest = trajectory
        .states
        .iter()
        .max_by(|a, b| a.altitude().total_cmp(&b.altitude()))
        .unwrap_or(last);
    println!("  Performance Summary");
    println!("{RULE}");
    println!(
        "  Altitude:      {:>8.0} m -> {:.0} m   (max {:.0} m at {:.1} s)",
        first.altitude(),
        last.altitude(),
        highest.altitude(),
        highest.time
    );
    println!(
        "  Ground track:  {:>8.0} m downrange, {:.0} m crossrange",
        last.downrange() - first.downrange(),
        last.crossrange() - first.crossrange()
    );
    println!(
        "  Final speed:   {:>8.1} m/s (Mach {:.2})",
        last.velocity(),
        atm.mach(last.velocity(), last.altitude())
    );
    println!("  Final mass:    {:>8.3} kg", last.mass());
    if !trajectory.extrapolations.is_empty() {
        println!();
        println!("  Extrapolated tables");
        println!("{RULE}");
        for w in &trajectory.extrapolations {
            println!("  {:<20} {:>8} queries", w.table, w.count);
        }
    }
    println!();

    // -----------------------------------------------------------------------
    // Trajectory table (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("{RULE}");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>8}  {:>8}  {:>8}  {:>8}",
        "t (s)", "alt (m)", "vel (m/s)", "Th (deg)", "a (deg)", "g (deg)", "mass(kg)"
    );
    println!("  {}", "─".repeat(66));

    let sample_interval = (trajectory.states.len() / 30).max(1);
    let n = trajectory.states.len();
    for (i, s) in trajectory.states.iter().enumerate() {
        if i % sample_interval != 0 && i != n - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.1}  {:>9.1}  {:>8.2}  {:>8.2}  {:>8.2}  {:>8.3}",
            s.time,
            s.altitude(),
            s.velocity(),
            s.path_angle().to_degrees(),
            s.alpha().to_degrees(),
            s.bank().to_degrees(),
            s.mass()
        );
    }

    println!();
    println!(
        "  Simulation: {} steps, dt={} s",
        trajectory.states.len() - 1,
        config.dt
    );
    println!("====================================================================");
}
