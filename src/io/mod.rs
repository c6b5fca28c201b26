pub mod json;
pub mod table;

pub use json::{write_summary, write_summary_file, FlightSummary};
pub use table::{write_trajectory, write_trajectory_file, TableOptions};
