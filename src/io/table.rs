use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::dynamics::state::State;

pub const HEADER: &str = "t[s]\tV[m/s]\tTh[deg]\tPsi[deg]\twZ[deg/s]\twX[deg/s]\t\
                          X[m]\tY[m]\tZ[m]\talpha[deg]\tgamma[deg]\tm[kg]";

/// Layout of the trajectory table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOptions {
    /// Write every n-th record, starting with the first. Zero is read as 1.
    pub every: usize,
    /// Use ',' as the decimal separator.
    pub decimal_comma: bool,
    pub header: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            every: 1,
            decimal_comma: false,
            header: true,
        }
    }
}

fn format_row(s: &State) -> String {
    format!(
        "{:.2}\t{:.1}\t{:.2}\t{:.2}\t{:.3}\t{:.3}\t{:.0}\t{:.0}\t{:.0}\t{:.2}\t{:.2}\t{:.3}",
        s.time,
        s.velocity(),
        s.path_angle().to_degrees(),
        s.heading().to_degrees(),
        s.pitch_rate().to_degrees(),
        s.roll_rate().to_degrees(),
        s.downrange(),
        s.altitude(),
        s.crossrange(),
        s.alpha().to_degrees(),
        s.bank().to_degrees(),
        s.mass(),
    )
}

/// Write states as a tab-delimited table, angles and rates in degrees.
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    states: &[State],
    options: &TableOptions,
) -> io::Result<()> {
    if options.header {
        writeln!(writer, "{HEADER}")?;
    }
    for s in states.iter().step_by(options.every.max(1)) {
        let row = format_row(s);
        if options.decimal_comma {
            writeln!(writer, "{}", row.replace('.', ","))?;
        } else {
            writeln!(writer, "{row}")?;
        }
    }
    Ok(())
}

/// Write the table to a file at the given path.
pub fn write_trajectory_file(
    path: impl AsRef<Path>,
    states: &[State],
    options: &TableOptions,
) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    write_trajectory(&mut file, states, options)?;
    file.flush()
}
