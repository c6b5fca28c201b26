use std::fmt;

use crate::dynamics::state::State;

// ---------------------------------------------------------------------------
// Flight events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Booster burnout or battery depletion.
    PropulsionCutoff,
    /// Path angle went from climbing to descending.
    Apogee,
    AltitudeCrossing { altitude: f64, ascending: bool },
    GroundContact,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::PropulsionCutoff => write!(f, "propulsion cutoff"),
            EventKind::Apogee => write!(f, "apogee"),
            EventKind::AltitudeCrossing { altitude, ascending } => write!(
                f,
                "altitude {altitude:.0} m ({})",
                if *ascending { "ascending" } else { "descending" }
            ),
            EventKind::GroundContact => write!(f, "ground contact"),
        }
    }
}

/// An event with the first state at which it was observed.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: State,
}

impl SimEvent {
    pub fn new(kind: EventKind, state: &State) -> Self {
        Self {
            time: state.time,
            kind,
            state: state.clone(),
        }
    }
}

/// Passive detector fed consecutive committed states.
pub trait EventDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind>;
}

/// Fires at every top of climb, i.e. when the path angle turns negative.
pub struct ApogeeDetector;

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if prev.path_angle() > 0.0 && current.path_angle() <= 0.0 {
            Some(EventKind::Apogee)
        } else {
            None
        }
    }
}

/// Fires once when the altitude crosses a threshold in one direction.
pub struct AltitudeDetector {
    pub altitude: f64,
    pub ascending: bool,
    fired: bool,
}

impl AltitudeDetector {
    pub fn new(altitude: f64, ascending: bool) -> Self {
        Self { altitude, ascending, fired: false }
    }
}

impl EventDetector for AltitudeDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        let crossed = if self.ascending {
            prev.altitude() < self.altitude && current.altitude() >= self.altitude
        } else {
            prev.altitude() > self.altitude && current.altitude() <= self.altitude
        };
        if crossed {
            self.fired = true;
            Some(EventKind::AltitudeCrossing {
                altitude: self.altitude,
                ascending: self.ascending,
            })
        } else {
            None
        }
    }
}

/// Fires once when the altitude first reaches zero from above.
#[derive(Default)]
pub struct GroundDetector {
    fired: bool,
}

impl EventDetector for GroundDetector {
    fn check(&mut self, prev: &State, current: &State) -> Option<EventKind> {
        if !self.fired && prev.altitude() > 0.0 && current.altitude() <= 0.0 {
            self.fired = true;
            Some(EventKind::GroundContact)
        } else {
            None
        }
    }
}

/// Run detectors over a committed trajectory.
pub fn detect_events(states: &[State], detectors: &mut [Box<dyn EventDetector>]) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for pair in states.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&pair[0], &pair[1]) {
                events.push(SimEvent::new(kind, &pair[1]));
            }
        }
    }
    events
}

/// Detectors every run gets.
pub fn default_detectors() -> Vec<Box<dyn EventDetector>> {
    vec![Box::new(ApogeeDetector), Box::new(GroundDetector::default())]
}
