use serde::{Deserialize, Serialize};

use super::airframe::{Airframe, AirframeBuilder};
use super::propulsion::Propulsion;
use crate::dynamics::state::{idx, State, StateVector};
use crate::gnc::FlightControlSystem;
use crate::physics::aerodynamics::AeroModel;

// ---------------------------------------------------------------------------
// Initial conditions
// ---------------------------------------------------------------------------

/// Launch state. Angles in radians, rates in rad/s.
///
/// Mass is not listed here: it is the airframe mass plus whatever
/// propellant the propulsion carries at ignition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialConditions {
    pub velocity: f64,
    pub path_angle: f64,
    pub heading: f64,
    pub pitch_rate: f64,
    pub roll_rate: f64,
    pub downrange: f64,
    pub altitude: f64,
    pub crossrange: f64,
    pub alpha: f64,
    pub bank: f64,
}

// ---------------------------------------------------------------------------
// Scenario: everything one run needs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub airframe: Airframe,
    pub aero: AeroModel,
    pub propulsion: Propulsion,
    pub controls: FlightControlSystem,
    pub initial: InitialConditions,
}

impl Scenario {
    /// Mass at ignition: airframe plus propellant.
    pub fn launch_mass(&self) -> f64 {
        self.airframe.mass + self.propulsion.propellant_mass()
    }

    /// State at t = 0.
    pub fn initial_state(&self) -> State {
        let ic = &self.initial;
        let mut x = StateVector::zeros();
        x[idx::VELOCITY] = ic.velocity;
        x[idx::PATH_ANGLE] = ic.path_angle;
        x[idx::HEADING] = ic.heading;
        x[idx::PITCH_RATE] = ic.pitch_rate;
        x[idx::ROLL_RATE] = ic.roll_rate;
        x[idx::DOWNRANGE] = ic.downrange;
        x[idx::ALTITUDE] = ic.altitude;
        x[idx::CROSSRANGE] = ic.crossrange;
        x[idx::ALPHA] = ic.alpha;
        x[idx::BANK] = ic.bank;
        x[idx::MASS] = self.launch_mass();
        State::new(0.0, x)
    }
}

// ---------------------------------------------------------------------------
// Scenario builder
// ---------------------------------------------------------------------------

pub struct ScenarioBuilder {
    name: String,
    airframe: Airframe,
    aero: AeroModel,
    propulsion: Propulsion,
    controls: FlightControlSystem,
    initial: InitialConditions,
}

impl ScenarioBuilder {
    /// Unpowered, uncontrolled, default airframe, at rest at the origin.
    pub fn new(name: impl Into<String>, aero: AeroModel) -> Self {
        let name = name.into();
        Self {
            airframe: AirframeBuilder::new(name.clone()).build(),
            name,
            aero,
            propulsion: Propulsion::None,
            controls: FlightControlSystem::new(),
            initial: InitialConditions::default(),
        }
    }

    pub fn airframe(mut self, airframe: Airframe) -> Self {
        self.airframe = airframe;
        self
    }

    pub fn propulsion(mut self, propulsion: Propulsion) -> Self {
        self.propulsion = propulsion;
        self
    }

    pub fn controls(mut self, controls: FlightControlSystem) -> Self {
        self.controls = controls;
        self
    }

    pub fn initial(mut self, initial: InitialConditions) -> Self {
        self.initial = initial;
        self
    }

    /// Speed, path angle (deg) and altitude, leaving the rest as is.
    pub fn launch(mut self, velocity: f64, path_angle_deg: f64, altitude: f64) -> Self {
        self.initial.velocity = velocity;
        self.initial.path_angle = path_angle_deg.to_radians();
        self.initial.altitude = altitude;
        self
    }

    pub fn build(self) -> Scenario {
        Scenario {
            name: self.name,
            airframe: self.airframe,
            aero: self.aero,
            propulsion: self.propulsion,
            controls: self.controls,
            initial: self.initial,
        }
    }
}

// ---------------------------------------------------------------------------
// Preset scenarios
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;
    use crate::gnc::{Axis, ControlChannel};
    use crate::table::{Table1D, Table2D, TableError};
    use crate::vehicle::propulsion::{ElectricMotor, SolidBooster};

    /// Angle of attack breakpoints, deg.
    pub const ALPHA_DEG: [f64; 17] = [
        -30.0, -20.0, -10.0, -8.0, -6.0, -4.0, -2.0, -1.0, 0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0,
        20.0, 30.0,
    ];
    /// Control surface breakpoints, deg.
    pub const DEFLECTION_DEG: [f64; 15] = [
        -25.0, -20.0, -15.0, -10.0, -5.0, -2.0, -1.0, 0.0, 1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 25.0,
    ];
    pub const MACH: [f64; 5] = [0.0, 0.3, 0.5, 0.7, 0.9];

    const LIFT: [f64; 17] = [
        -2.34009, -1.58131, -0.82254, -0.67079, -0.51903, -0.36728, -0.21552, -0.13965, -0.06377,
        0.01211, 0.08799, 0.23974, 0.3915, 0.54325, 0.695, 1.45378, 2.21255,
    ];
    const DRAG: [f64; 17] = [
        0.50002, 0.25604, 0.10648, 0.0879, 0.07309, 0.06206, 0.05481, 0.0526, 0.05133, 0.05101,
        0.05164, 0.05571, 0.06357, 0.0752, 0.09061, 0.2243, 0.45241,
    ];
    const PITCH: [f64; 17] = [
        2.53222, 1.83047, 1.12872, 0.98837, 0.84802, 0.70767, 0.56732, 0.49715, 0.42697, 0.3568,
        0.28662, 0.14627, 0.00592, -0.13443, -0.27478, -0.97652, -1.67827,
    ];
    const ELEVATOR: [f64; 15] = [
        1.06031, 0.88241, 0.7045, 0.5266, 0.34869, 0.24195, 0.20637, 0.17079, 0.13521, 0.09963,
        -0.00712, -0.18502, -0.36293, -0.54083, -0.71874,
    ];
    const AILERON: [f64; 15] = [
        -0.12687, -0.1015, -0.07612, -0.05075, -0.02537, -0.01015, -0.00507, 0.0, 0.00507,
        0.01015, 0.02537, 0.05075, 0.07612, 0.1015, 0.12687,
    ];

    fn mach_invariant(row: &[f64]) -> Result<Table2D, TableError> {
        let grid = MACH.iter().map(|_| row.to_vec()).collect();
        Table2D::new(MACH.to_vec(), ALPHA_DEG.to_vec(), grid, (0.0, 0.0))
    }

    /// Wind-tunnel set of the small test glider. The coefficients do not
    /// vary with Mach over the tabulated range.
    pub fn test_glider_aero() -> Result<AeroModel, TableError> {
        Ok(AeroModel::new(
            mach_invariant(&LIFT)?,
            mach_invariant(&DRAG)?,
            mach_invariant(&PITCH)?,
            Table1D::new(DEFLECTION_DEG.to_vec(), ELEVATOR.to_vec(), 0.0)?,
            Table1D::new(DEFLECTION_DEG.to_vec(), AILERON.to_vec(), 0.0)?,
        ))
    }

    pub fn test_airframe() -> Airframe {
        AirframeBuilder::new("Test glider")
            .mass(2.5)
            .wing_area(0.033)
            .chord(0.04)
            .jx(0.4)
            .jz(0.25)
            .build()
    }

    /// Holds the path angle, measuring its rate through alpha.
    pub fn pitch_hold(target_deg: f64) -> ControlChannel {
        ControlChannel::new(Axis::Pitch)
            .gains(200.0, 100.0, 10.0)
            .limits(-20.0, 20.0)
            .slew_rate(60.0)
            .sparsity(0.01)
            .target(target_deg.to_radians())
            .enabled(true)
    }

    /// Holds the bank angle. Positive aileron rolls positive, so the gains
    /// are negative.
    pub fn roll_hold(target_deg: f64) -> ControlChannel {
        ControlChannel::new(Axis::Roll)
            .gains(-100.0, -20.0, -20.0)
            .limits(-20.0, 20.0)
            .slew_rate(60.0)
            .sparsity(0.01)
            .target(target_deg.to_radians())
            .enabled(true)
    }

    /// Open-loop descent from 14.5 km with neutral surfaces.
    pub fn gliding_descent() -> Result<Scenario, TableError> {
        Ok(ScenarioBuilder::new("Gliding descent", test_glider_aero()?)
            .airframe(test_airframe())
            .launch(225.0, 1.0, 14_500.0)
            .build())
    }

    /// Same launch with the path angle held at -5 deg.
    pub fn pitch_hold_glide() -> Result<Scenario, TableError> {
        let controls =
            FlightControlSystem::with_channels(pitch_hold(-5.0), ControlChannel::new(Axis::Roll));
        Ok(ScenarioBuilder::new("Pitch-hold glide", test_glider_aero()?)
            .airframe(test_airframe())
            .controls(controls)
            .launch(225.0, 1.0, 14_500.0)
            .build())
    }

    /// -5 deg glide in a steady 20 deg bank.
    pub fn banked_turn() -> Result<Scenario, TableError> {
        let controls = FlightControlSystem::with_channels(pitch_hold(-5.0), roll_hold(20.0));
        Ok(ScenarioBuilder::new("Banked turn", test_glider_aero()?)
            .airframe(test_airframe())
            .controls(controls)
            .launch(225.0, 1.0, 14_500.0)
            .build())
    }

    /// 0.2 kg solid booster burning 0.05 kg/s for four seconds, climbing
    /// at 5 deg.
    pub fn boosted_climb() -> Result<Scenario, TableError> {
        let schedule = Table1D::new(
            vec![0.0, 4.0, 4.001, 1_000.0],
            vec![0.05, 0.05, 0.0, 0.0],
            0.0,
        )?;
        let booster = SolidBooster::new(0.2, 1_800.0, schedule);
        let controls =
            FlightControlSystem::with_channels(pitch_hold(5.0), ControlChannel::new(Axis::Roll));
        Ok(ScenarioBuilder::new("Boosted climb", test_glider_aero()?)
            .airframe(test_airframe())
            .propulsion(Propulsion::SolidBooster(booster))
            .controls(controls)
            .launch(60.0, 10.0, 500.0)
            .build())
    }

    /// Level cruise on a 15 N motor until the battery runs out at 30 s.
    pub fn electric_glider() -> Result<Scenario, TableError> {
        let schedule = Table1D::new(vec![0.0, 1_000.0], vec![1.0, 1.0], 0.0)?;
        let motor = ElectricMotor::new(600.0, 15.0, 20.0, schedule);
        let controls =
            FlightControlSystem::with_channels(pitch_hold(0.0), ControlChannel::new(Axis::Roll));
        Ok(ScenarioBuilder::new("Electric glider", test_glider_aero()?)
            .airframe(test_airframe())
            .propulsion(Propulsion::ElectricMotor(motor))
            .controls(controls)
            .launch(120.0, 0.0, 1_000.0)
            .build())
    }

    /// Preset by short name, as accepted on the command line.
    pub fn by_name(name: &str) -> Option<Result<Scenario, TableError>> {
        match name {
            "glide" => Some(gliding_descent()),
            "pitch-hold" => Some(pitch_hold_glide()),
            "turn" => Some(banked_turn()),
            "boost" => Some(boosted_climb()),
            "electric" => Some(electric_glider()),
            _ => None,
        }
    }

    pub const NAMES: [&str; 5] = ["glide", "pitch-hold", "turn", "boost", "electric"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn initial_state_carries_propellant_mass() {
        let s = presets::boosted_climb().unwrap();
        let x0 = s.initial_state();
        assert_eq!(x0.time, 0.0);
        assert_relative_eq!(x0.mass(), 2.7, epsilon = 1e-12);
        assert_relative_eq!(x0.path_angle(), 10f64.to_radians());
        assert_eq!(x0.altitude(), 500.0);
    }

    #[test]
    fn unpowered_mass_is_airframe_mass() {
        let s = presets::gliding_descent().unwrap();
        assert_eq!(s.initial_state().mass(), 2.5);
        assert_eq!(s.initial_state().velocity(), 225.0);
    }

    #[test]
    fn test_aero_reproduces_tabulated_points() {
        let mut aero = presets::test_glider_aero().unwrap();
        assert_relative_eq!(aero.lift.eval(0.5, 10.0), 0.695, epsilon = 1e-12);
        assert_relative_eq!(aero.drag.eval(0.76, 0.0), 0.05133, epsilon = 1e-12);
        assert_relative_eq!(aero.elevator.eval(25.0), -0.71874);
        assert_relative_eq!(aero.aileron.eval(-1.0), -0.00507);
    }

    #[test]
    fn every_named_preset_builds() {
        for name in presets::NAMES {
            let s = presets::by_name(name).unwrap().unwrap();
            assert!(s.airframe.validate().is_ok(), "{name}");
        }
        assert!(presets::by_name("orbit").is_none());
    }
}
