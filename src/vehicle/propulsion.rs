use log::info;

use crate::table::{ExtrapolationWarning, Table1D};

/// Instantaneous propulsion output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThrustSample {
    pub mass_flow: f64, // kg/s
    pub force: f64,     // N
}

impl ThrustSample {
    /// Scale the sample down so mass flow does not exceed `max_flow`.
    fn limited(self, max_flow: f64) -> Self {
        if self.mass_flow > max_flow && self.mass_flow > 0.0 {
            let k = max_flow.max(0.0) / self.mass_flow;
            Self {
                mass_flow: self.mass_flow * k,
                force: self.force * k,
            }
        } else {
            self
        }
    }
}

// ---------------------------------------------------------------------------
// Solid booster
// ---------------------------------------------------------------------------

/// Solid motor driven by a mass-flow(time) schedule.
///
/// Fuel is consumed as `mass_flow * dt` per committed step. When the last
/// of it goes the booster is inactive for good.
#[derive(Debug, Clone)]
pub struct SolidBooster {
    fuel_mass: f64,         // kg
    remaining: f64,         // kg
    exhaust_velocity: f64,  // m/s, effective
    schedule: Table1D,      // kg/s vs s
    active: bool,
}

impl SolidBooster {
    pub fn new(fuel_mass: f64, exhaust_velocity: f64, schedule: Table1D) -> Self {
        Self {
            fuel_mass,
            remaining: fuel_mass,
            exhaust_velocity,
            schedule: schedule.labelled("booster_mass_flow"),
            active: fuel_mass > 0.0,
        }
    }

    pub fn thrust_at(&mut self, t: f64) -> ThrustSample {
        if !self.active {
            return ThrustSample::default();
        }
        let mass_flow = self.schedule.eval(t).max(0.0);
        ThrustSample {
            mass_flow,
            force: mass_flow * self.exhaust_velocity,
        }
    }

    /// Output for a step of length `dt`, capped to the fuel left.
    pub fn sample(&mut self, t: f64, dt: f64) -> ThrustSample {
        let remaining = self.remaining;
        self.thrust_at(t).limited(remaining / dt)
    }

    pub fn advance(&mut self, t: f64, dt: f64) {
        if !self.active {
            return;
        }
        let burned = self.thrust_at(t).mass_flow * dt;
        if burned >= self.remaining {
            self.remaining = 0.0;
            self.active = false;
            info!("booster burnout at t = {:.3} s", t + dt);
        } else {
            self.remaining -= burned;
        }
    }

    pub fn fuel_mass(&self) -> f64 {
        self.fuel_mass
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

// ---------------------------------------------------------------------------
// Electric motor
// ---------------------------------------------------------------------------

/// Battery-driven motor following a drain-fraction(time) schedule in [0, 1].
///
/// Thrust is `max_thrust * fraction`; charge drops by
/// `max_drain * fraction * dt` per committed step. Mass is constant.
#[derive(Debug, Clone)]
pub struct ElectricMotor {
    total_charge: f64,
    remaining: f64,
    max_thrust: f64, // N
    max_drain: f64,  // charge units per s at full throttle
    schedule: Table1D,
    active: bool,
}

impl ElectricMotor {
    pub fn new(total_charge: f64, max_thrust: f64, max_drain: f64, schedule: Table1D) -> Self {
        Self {
            total_charge,
            remaining: total_charge,
            max_thrust,
            max_drain,
            schedule: schedule.labelled("motor_drain"),
            active: total_charge > 0.0,
        }
    }

    fn drain_at(&mut self, t: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        self.schedule.eval(t).max(0.0).min(1.0)
    }

    pub fn thrust_at(&mut self, t: f64) -> ThrustSample {
        ThrustSample {
            mass_flow: 0.0,
            force: self.max_thrust * self.drain_at(t),
        }
    }

    pub fn sample(&mut self, t: f64, dt: f64) -> ThrustSample {
        let mut drain = self.drain_at(t);
        let full = self.max_drain * drain * dt;
        if full > self.remaining && full > 0.0 {
            drain *= self.remaining / full;
        }
        ThrustSample {
            mass_flow: 0.0,
            force: self.max_thrust * drain,
        }
    }

    pub fn advance(&mut self, t: f64, dt: f64) {
        if !self.active {
            return;
        }
        let drained = self.max_drain * self.drain_at(t) * dt;
        if drained >= self.remaining {
            self.remaining = 0.0;
            self.active = false;
            info!("battery depleted at t = {:.3} s", t + dt);
        } else {
            self.remaining -= drained;
        }
    }

    pub fn total_charge(&self) -> f64 {
        self.total_charge
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

// ---------------------------------------------------------------------------
// Propulsion variant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub enum Propulsion {
    #[default]
    None,
    SolidBooster(SolidBooster),
    ElectricMotor(ElectricMotor),
}

impl Propulsion {
    pub fn thrust_at(&mut self, t: f64) -> ThrustSample {
        match self {
            Propulsion::None => ThrustSample::default(),
            Propulsion::SolidBooster(b) => b.thrust_at(t),
            Propulsion::ElectricMotor(m) => m.thrust_at(t),
        }
    }

    /// Output held over the step `[t, t + dt]`.
    pub fn sample(&mut self, t: f64, dt: f64) -> ThrustSample {
        match self {
            Propulsion::None => ThrustSample::default(),
            Propulsion::SolidBooster(b) => b.sample(t, dt),
            Propulsion::ElectricMotor(m) => m.sample(t, dt),
        }
    }

    /// Consume fuel or charge for one committed step.
    pub fn advance(&mut self, t: f64, dt: f64) {
        match self {
            Propulsion::None => {}
            Propulsion::SolidBooster(b) => b.advance(t, dt),
            Propulsion::ElectricMotor(m) => m.advance(t, dt),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Propulsion::None => false,
            Propulsion::SolidBooster(b) => b.is_active(),
            Propulsion::ElectricMotor(m) => m.is_active(),
        }
    }

    /// Fuel (kg) or charge left.
    pub fn remaining(&self) -> f64 {
        match self {
            Propulsion::None => 0.0,
            Propulsion::SolidBooster(b) => b.remaining(),
            Propulsion::ElectricMotor(m) => m.remaining(),
        }
    }

    /// Mass carried as propellant at ignition, kg.
    pub fn propellant_mass(&self) -> f64 {
        match self {
            Propulsion::SolidBooster(b) => b.fuel_mass(),
            Propulsion::None | Propulsion::ElectricMotor(_) => 0.0,
        }
    }

    /// Set if the schedule was queried past its last breakpoint.
    pub fn extrapolation_warning(&self) -> Option<ExtrapolationWarning> {
        match self {
            Propulsion::None => None,
            Propulsion::SolidBooster(b) => b.schedule.extrapolation_warning(),
            Propulsion::ElectricMotor(m) => m.schedule.extrapolation_warning(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Propulsion::None => "none",
            Propulsion::SolidBooster(_) => "solid booster",
            Propulsion::ElectricMotor(_) => "electric motor",
        }
    }
}
