// FarmWatch — Actuation Gate
//
// Two-state hysteresis between the PID output and the irrigation relay.

use crate::events::GateEdge;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Off,
    On,
}

#[derive(Debug, Clone, Copy)]
pub struct ActuationGate {
    activate_above: f32,
    deactivate_below: f32,
    state: GateState,
}

impl ActuationGate {
    /// `deactivate_below` must be strictly lower than `activate_above`
    /// (checked by `ControllerConfig::validate`).
    pub fn new(activate_above: f32, deactivate_below: f32) -> Self {
        Self {
            activate_above,
            deactivate_below,
            state: GateState::Off,
        }
    }

    /// Feed one PID output. Returns the edge when the state changes; inside
    /// the band the previous state holds.
    pub fn update(&mut self, output: f32) -> Option<GateEdge> {
        match self.state {
            GateState::Off if output > self.activate_above => {
                self.state = GateState::On;
                Some(GateEdge::Activated)
            }
            GateState::On if output < self.deactivate_below => {
                self.state = GateState::Off;
                Some(GateEdge::Deactivated)
            }
            _ => None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_on(&self) -> bool {
        self.state == GateState::On
    }
}
