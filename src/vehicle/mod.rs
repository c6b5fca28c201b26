pub mod airframe;
pub mod config;
pub mod propulsion;
pub mod scenario;

pub use airframe::{Airframe, AirframeBuilder};
pub use config::{ConfigError, ScenarioConfig};
pub use propulsion::{ElectricMotor, Propulsion, SolidBooster, ThrustSample};
pub use scenario::{presets, InitialConditions, Scenario, ScenarioBuilder};
