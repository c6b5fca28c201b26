pub mod event;
pub mod integrator;
pub mod runner;

pub use event::{
    default_detectors, detect_events, AltitudeDetector, ApogeeDetector, EventDetector, EventKind,
    GroundDetector, SimEvent,
};
pub use integrator::rk4_step;
pub use runner::{simulate, simulate_with, Trajectory};
