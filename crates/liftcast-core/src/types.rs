//! Wire-level enums shared by the ingestion and display sides.
//!
//! Every enum serializes to the exact string the upstream controller sends,
//! so snapshots can be handed to display clients unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ParseError::UnknownValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Phase of the field of play as reported by the controller.
    FopState {
        Inactive => "INACTIVE",
        TimeRunning => "TIME_RUNNING",
        TimeStopped => "TIME_STOPPED",
        CurrentAthleteDisplayed => "CURRENT_ATHLETE_DISPLAYED",
        DownSignalVisible => "DOWN_SIGNAL_VISIBLE",
        DecisionVisible => "DECISION_VISIBLE",
        Break => "BREAK",
    }
}

wire_enum! {
    /// Competition phase context shown by displays.
    Mode {
        Wait => "WAIT",
        Lifting => "LIFTING",
        CurrentAthlete => "CURRENT_ATHLETE",
        BeforeIntroduction => "BEFORE_INTRODUCTION",
        Introduction => "INTRODUCTION",
        LiftCountdownCeremony => "LIFT_COUNTDOWN_CEREMONY",
        FirstSnatch => "FIRST_SNATCH",
        FirstCj => "FIRST_CJ",
        Marshal => "MARSHAL",
        Technical => "TECHNICAL",
    }
}

wire_enum! {
    BreakType {
        BeforeIntroduction => "BEFORE_INTRODUCTION",
        Ceremony => "CEREMONY",
        Challenge => "CHALLENGE",
        FirstCj => "FIRST_CJ",
        FirstSnatch => "FIRST_SNATCH",
        GroupDone => "GROUP_DONE",
        Jury => "JURY",
        Marshal => "MARSHAL",
        SnatchDone => "SNATCH_DONE",
        Technical => "TECHNICAL",
    }
}

wire_enum! {
    CeremonyType {
        Introduction => "INTRODUCTION",
        Medals => "MEDALS",
        OfficialsIntroduction => "OFFICIALS_INTRODUCTION",
    }
}

wire_enum! {
    /// A single referee or jury ruling.
    Decision {
        Good => "good",
        Bad => "bad",
    }
}

wire_enum! {
    LiftTypeKey {
        Snatch => "SNATCH",
        CleanAndJerk => "CLEAN_AND_JERK",
    }
}

wire_enum! {
    /// Whether the current attempt touches a record.
    RecordKind {
        None => "none",
        Attempt => "attempt",
        New => "new",
        Denied => "denied",
    }
}

impl Default for RecordKind {
    fn default() -> Self {
        RecordKind::None
    }
}

impl LiftTypeKey {
    /// Parse the controller's lift type key (`Snatch`, `Clean_and_Jerk`)
    /// regardless of casing.
    pub fn from_wire(key: &str) -> Result<Self, ParseError> {
        key.trim().to_ascii_uppercase().parse()
    }
}

/// The three referee lights, left to right as seen from the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefereeDecisions {
    pub left: Option<Decision>,
    pub center: Option<Decision>,
    pub right: Option<Decision>,
}

/// A jury ruling on the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JuryDecision {
    pub decision: Decision,
    pub reversal: bool,
}

/// Display name and description of the session currently lifting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub name: Option<String>,
    pub info: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fop_state_round_trips_wire_name() {
        let state: FopState = "DOWN_SIGNAL_VISIBLE".parse().unwrap();
        assert_eq!(state, FopState::DownSignalVisible);
        assert_eq!(state.to_string(), "DOWN_SIGNAL_VISIBLE");
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let err = "SOMETHING_ELSE".parse::<Mode>().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownValue {
                kind: "Mode",
                value: "SOMETHING_ELSE".to_string()
            }
        );
    }

    #[test]
    fn test_lift_type_key_normalizes_casing() {
        assert_eq!(
            LiftTypeKey::from_wire("Clean_and_Jerk").unwrap(),
            LiftTypeKey::CleanAndJerk
        );
        assert_eq!(LiftTypeKey::from_wire("Snatch").unwrap(), LiftTypeKey::Snatch);
        assert!(LiftTypeKey::from_wire("Bench").is_err());
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Decision::Good).unwrap(), "\"good\"");
        assert_eq!(serde_json::to_string(&RecordKind::None).unwrap(), "\"none\"");
    }
}
