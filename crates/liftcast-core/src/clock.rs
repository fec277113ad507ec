use serde::{Serialize, Serializer};

/// Time left on a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Finite(u64),
    /// No numeric end, e.g. a break waiting for the next session.
    Indefinite,
}

impl Remaining {
    pub fn millis(&self) -> Option<u64> {
        match self {
            Remaining::Finite(ms) => Some(*ms),
            Remaining::Indefinite => None,
        }
    }
}

impl Default for Remaining {
    fn default() -> Self {
        Remaining::Finite(0)
    }
}

impl Serialize for Remaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Remaining::Finite(ms) => serializer.serialize_u64(*ms),
            Remaining::Indefinite => serializer.serialize_none(),
        }
    }
}

/// Snapshot of a countdown, replaced wholesale on every timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockState {
    pub is_stopped: bool,
    pub milliseconds: Remaining,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            is_stopped: true,
            milliseconds: Remaining::default(),
        }
    }
}

impl ClockState {
    pub fn new(is_stopped: bool, milliseconds: Remaining) -> Self {
        Self {
            is_stopped,
            milliseconds,
        }
    }
}

/// A stopped/running countdown. Ticking is left to the display clients;
/// the server only records the last reported state.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    state: ClockState,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn update(&mut self, state: ClockState) {
        self.state = state;
    }
}
