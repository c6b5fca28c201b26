use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::airframe::Airframe;
use super::propulsion::{ElectricMotor, Propulsion, SolidBooster};
use super::scenario::{presets, InitialConditions, Scenario};
use crate::dynamics::state::SimConfig;
use crate::gnc::{AntiWindup, Axis, ControlChannel, DerivativeSource, FlightControlSystem};
use crate::physics::aerodynamics::AeroModel;
use crate::table::{Table1D, Table2D, TableError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid table: {0}")]
    Table(#[from] TableError),
    #[error("invalid scenario: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw scenario file
// ---------------------------------------------------------------------------

/// Scenario as written on disk. Angles are in degrees here and converted
/// to radians when the scenario is built.
///
/// Omitting `aero` selects the built-in test glider tables.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub airframe: Airframe,
    pub initial: InitialConfig,
    #[serde(default)]
    pub aero: Option<AeroConfig>,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub propulsion: PropulsionConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    pub velocity: f64,          // m/s
    pub path_angle_deg: f64,
    pub heading_deg: f64,
    pub pitch_rate_deg_s: f64,
    pub roll_rate_deg_s: f64,
    pub downrange: f64,         // m
    pub altitude: f64,          // m
    pub crossrange: f64,        // m
    pub alpha_deg: f64,
    pub bank_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table1DConfig {
    pub axis: Vec<f64>,
    pub values: Vec<f64>,
}

/// Grid over Mach (rows) and angle of attack in degrees (columns).
#[derive(Debug, Clone, Deserialize)]
pub struct Table2DConfig {
    pub mach: Vec<f64>,
    pub alpha_deg: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AeroConfig {
    pub lift: Table2DConfig,
    pub drag: Table2DConfig,
    pub pitch_moment: Table2DConfig,
    pub elevator: Table1DConfig,
    pub aileron: Table1DConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub pitch: ChannelConfig,
    pub roll: ChannelConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub enabled: bool,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub min_deflection: f64, // deg
    pub max_deflection: f64, // deg
    pub slew_rate: Option<f64>, // deg/s, unlimited when absent
    pub sparsity: f64,       // s
    pub target_deg: f64,
    pub bias_deg: f64,
    pub derivative: Option<DerivativeSource>,
    pub anti_windup: AntiWindup,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            min_deflection: -25.0,
            max_deflection: 25.0,
            slew_rate: None,
            sparsity: 0.0,
            target_deg: 0.0,
            bias_deg: 0.0,
            derivative: None,
            anti_windup: AntiWindup::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropulsionConfig {
    #[default]
    None,
    SolidBooster {
        fuel_mass: f64,        // kg
        exhaust_velocity: f64, // m/s
        mass_flow: Table1DConfig,
    },
    ElectricMotor {
        total_charge: f64,
        max_thrust: f64, // N
        max_drain: f64,  // charge per s
        drain: Table1DConfig,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let defaults = SimConfig::default();
        Self {
            dt: defaults.dt,
            max_time: defaults.max_time,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and conversion
// ---------------------------------------------------------------------------

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Step and horizon from the file, default physical constants.
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            dt: self.simulation.dt,
            max_time: self.simulation.max_time,
            ..SimConfig::default()
        }
    }

    pub fn to_scenario(&self) -> Result<Scenario, ConfigError> {
        Scenario::from_config(self)
    }
}

fn positive(name: &str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be positive, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must not be negative, got {v}")))
    }
}

impl Table1DConfig {
    fn build(&self) -> Result<Table1D, TableError> {
        let start = self.axis.first().copied().unwrap_or_default();
        Table1D::new(self.axis.clone(), self.values.clone(), start)
    }
}

impl Table2DConfig {
    fn build(&self) -> Result<Table2D, TableError> {
        Table2D::new(
            self.mach.clone(),
            self.alpha_deg.clone(),
            self.values.clone(),
            (0.0, 0.0),
        )
    }
}

impl AeroConfig {
    fn build(&self) -> Result<AeroModel, TableError> {
        Ok(AeroModel::new(
            self.lift.build()?,
            self.drag.build()?,
            self.pitch_moment.build()?,
            self.elevator.build()?,
            self.aileron.build()?,
        ))
    }
}

impl InitialConfig {
    fn to_radians(&self) -> InitialConditions {
        InitialConditions {
            velocity: self.velocity,
            path_angle: self.path_angle_deg.to_radians(),
            heading: self.heading_deg.to_radians(),
            pitch_rate: self.pitch_rate_deg_s.to_radians(),
            roll_rate: self.roll_rate_deg_s.to_radians(),
            downrange: self.downrange,
            altitude: self.altitude,
            crossrange: self.crossrange,
            alpha: self.alpha_deg.to_radians(),
            bank: self.bank_deg.to_radians(),
        }
    }
}

impl ChannelConfig {
    fn build(&self, axis: Axis) -> ControlChannel {
        let mut channel = ControlChannel::new(axis)
            .gains(self.kp, self.ki, self.kd)
            .limits(self.min_deflection, self.max_deflection)
            .sparsity(self.sparsity)
            .target(self.target_deg.to_radians())
            .derivative(self.derivative.unwrap_or_else(|| axis.default_rate_source()))
            .anti_windup(self.anti_windup)
            .enabled(self.enabled);
        if let Some(rate) = self.slew_rate {
            channel = channel.slew_rate(rate);
        }
        channel.set_bias(self.bias_deg);
        channel
    }

    fn validate(&self, axis: &str) -> Result<(), ConfigError> {
        let gains = [self.kp, self.ki, self.kd, self.target_deg, self.bias_deg];
        if gains.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Validation(format!(
                "{axis} channel settings must be finite"
            )));
        }
        non_negative(&format!("{axis} sparsity"), self.sparsity)?;
        if let Some(DerivativeSource::Component(i)) = self.derivative {
            if i >= crate::dynamics::N_STATE {
                return Err(ConfigError::Validation(format!(
                    "{axis} derivative source {i} is not a state component"
                )));
            }
        }
        Ok(())
    }
}

impl PropulsionConfig {
    fn build(&self) -> Result<Propulsion, ConfigError> {
        Ok(match self {
            PropulsionConfig::None => Propulsion::None,
            PropulsionConfig::SolidBooster {
                fuel_mass,
                exhaust_velocity,
                mass_flow,
            } => {
                non_negative("booster fuel_mass", *fuel_mass)?;
                positive("booster exhaust_velocity", *exhaust_velocity)?;
                Propulsion::SolidBooster(SolidBooster::new(
                    *fuel_mass,
                    *exhaust_velocity,
                    mass_flow.build()?,
                ))
            }
            PropulsionConfig::ElectricMotor {
                total_charge,
                max_thrust,
                max_drain,
                drain,
            } => {
                non_negative("motor total_charge", *total_charge)?;
                non_negative("motor max_thrust", *max_thrust)?;
                non_negative("motor max_drain", *max_drain)?;
                Propulsion::ElectricMotor(ElectricMotor::new(
                    *total_charge,
                    *max_thrust,
                    *max_drain,
                    drain.build()?,
                ))
            }
        })
    }
}

impl Scenario {
    /// Validate a scenario file and build every table it names.
    pub fn from_config(config: &ScenarioConfig) -> Result<Scenario, ConfigError> {
        config.airframe.validate().map_err(ConfigError::Validation)?;
        positive("initial velocity", config.initial.velocity)?;
        positive("simulation dt", config.simulation.dt)?;
        positive("simulation max_time", config.simulation.max_time)?;
        config.controls.pitch.validate("pitch")?;
        config.controls.roll.validate("roll")?;

        let aero = match &config.aero {
            Some(tables) => tables.build()?,
            None => presets::test_glider_aero()?,
        };
        let controls = FlightControlSystem::with_channels(
            config.controls.pitch.build(Axis::Pitch),
            config.controls.roll.build(Axis::Roll),
        );

        Ok(Scenario {
            name: config.name.clone(),
            airframe: config.airframe.clone(),
            aero,
            propulsion: config.propulsion.build()?,
            controls,
            initial: config.initial.to_radians(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const AIRFRAME: &str = r#"{
        "name": "Test glider", "mass": 2.5, "wing_area": 0.033,
        "chord": 0.04, "jx": 0.4, "jz": 0.25
    }"#;

    fn config(extra: &str) -> String {
        format!(
            r#"{{
                "name": "From file",
                "airframe": {AIRFRAME},
                "initial": {{ "velocity": 225.0, "path_angle_deg": 1.0, "altitude": 14500.0 }}
                {extra}
            }}"#
        )
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let cfg = ScenarioConfig::from_json_str(&config("")).unwrap();
        let sim = cfg.sim_config();
        assert_eq!(sim.dt, 0.002);
        assert_eq!(sim.max_time, 120.5);

        let s = cfg.to_scenario().unwrap();
        assert!(matches!(s.propulsion, Propulsion::None));
        assert!(!s.controls.pitch.is_active());
        let x0 = s.initial_state();
        assert_relative_eq!(x0.path_angle(), 1f64.to_radians());
        assert_eq!(x0.mass(), 2.5);
    }

    #[test]
    fn booster_and_channels_are_built() {
        let extra = r#",
            "controls": {
                "pitch": { "enabled": true, "kp": 200, "ki": 100, "kd": 10,
                           "min_deflection": -20, "max_deflection": 20,
                           "slew_rate": 60, "sparsity": 0.01, "target_deg": -5 },
                "roll": { "bias_deg": 1.5 }
            },
            "propulsion": {
                "kind": "solid_booster", "fuel_mass": 0.2, "exhaust_velocity": 1800,
                "mass_flow": { "axis": [0, 4, 4.001, 1000], "values": [0.05, 0.05, 0, 0] }
            },
            "simulation": { "dt": 0.001, "max_time": 10 }"#;
        let cfg = ScenarioConfig::from_json_str(&config(extra)).unwrap();
        let s = Scenario::from_config(&cfg).unwrap();

        assert!(s.controls.pitch.is_active());
        assert_eq!(s.controls.deflections().aileron, 1.5);
        assert_eq!(s.propulsion.kind(), "solid booster");
        assert_relative_eq!(s.initial_state().mass(), 2.7, epsilon = 1e-12);
        assert_eq!(cfg.sim_config().dt, 0.001);
    }

    #[test]
    fn electric_motor_is_built() {
        let extra = r#",
            "propulsion": {
                "kind": "electric_motor", "total_charge": 600, "max_thrust": 15,
                "max_drain": 20, "drain": { "axis": [0, 1000], "values": [1, 1] }
            }"#;
        let s = ScenarioConfig::from_json_str(&config(extra))
            .unwrap()
            .to_scenario()
            .unwrap();
        assert_eq!(s.propulsion.kind(), "electric motor");
        assert_eq!(s.initial_state().mass(), 2.5);
    }

    #[test]
    fn bad_table_is_reported() {
        let extra = r#",
            "propulsion": {
                "kind": "solid_booster", "fuel_mass": 0.2, "exhaust_velocity": 1800,
                "mass_flow": { "axis": [0, 4, 2], "values": [0.05, 0.05, 0] }
            }"#;
        let err = ScenarioConfig::from_json_str(&config(extra))
            .unwrap()
            .to_scenario()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Table(TableError::NotIncreasing { .. })), "{err}");
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let extra = r#", "simulation": { "dt": 0.0 }"#;
        let err = ScenarioConfig::from_json_str(&config(extra))
            .unwrap()
            .to_scenario()
            .unwrap_err();
        assert!(err.to_string().contains("dt"), "{err}");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ScenarioConfig::from_json_str("{ \"name\": ").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ScenarioConfig::from_file("/nonexistent/scenario.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
