use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::physics::atmosphere::Atmosphere;
use crate::sim::Trajectory;
use crate::vehicle::Scenario;

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub time_s: f64,
    pub event: String,
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtrapolationRecord {
    pub table: String,
    pub queries: usize,
}

/// Summary statistics of one run.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub scenario: String,
    pub propulsion: String,
    pub steps: usize,
    pub flight_time_s: f64,
    pub initial_altitude_m: f64,
    pub final_altitude_m: f64,
    pub max_altitude_m: f64,
    pub max_altitude_time_s: f64,
    pub min_speed_ms: f64,
    pub max_speed_ms: f64,
    pub max_mach: f64,
    pub downrange_m: f64,
    pub crossrange_m: f64,
    pub final_heading_deg: f64,
    pub launch_mass_kg: f64,
    pub final_mass_kg: f64,
    pub events: Vec<EventRecord>,
    pub extrapolated_tables: Vec<ExtrapolationRecord>,
}

impl FlightSummary {
    /// `None` for an empty trajectory.
    pub fn from_trajectory(
        scenario: &Scenario,
        trajectory: &Trajectory,
        atmosphere: &Atmosphere,
    ) -> Option<Self> {
        let states = &trajectory.states;
        let first = states.first()?;
        let last = states.last()?;

        let highest = states
            .iter()
            .max_by(|a, b| a.altitude().total_cmp(&b.altitude()))?;
        let speeds = states.iter().map(|s| s.velocity());
        let max_mach = states
            .iter()
            .map(|s| atmosphere.mach(s.velocity(), s.altitude()))
            .fold(0.0_f64, f64::max);

        Some(FlightSummary {
            scenario: scenario.name.clone(),
            propulsion: scenario.propulsion.kind().to_string(),
            steps: states.len() - 1,
            flight_time_s: last.time - first.time,
            initial_altitude_m: first.altitude(),
            final_altitude_m: last.altitude(),
            max_altitude_m: highest.altitude(),
            max_altitude_time_s: highest.time,
            min_speed_ms: speeds.clone().fold(f64::INFINITY, f64::min),
            max_speed_ms: speeds.fold(0.0_f64, f64::max),
            max_mach,
            downrange_m: last.downrange() - first.downrange(),
            crossrange_m: last.crossrange() - first.crossrange(),
            final_heading_deg: last.heading().to_degrees(),
            launch_mass_kg: first.mass(),
            final_mass_kg: last.mass(),
            events: trajectory
                .events
                .iter()
                .map(|e| EventRecord {
                    time_s: e.time,
                    event: e.kind.to_string(),
                    altitude_m: e.state.altitude(),
                })
                .collect(),
            extrapolated_tables: trajectory
                .extrapolations
                .iter()
                .map(|w| ExtrapolationRecord {
                    table: w.table.to_string(),
                    queries: w.count,
                })
                .collect(),
        })
    }
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write the summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_summary(&mut file, summary)?;
    file.flush()
}
