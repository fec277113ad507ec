//! Liftcast Core - Platform state machine and display data model.
//!
//! This crate holds the synchronous domain: one [`Platform`] per field of
//! play, its athletes, clocks and record board. It has no async runtime and
//! no dependencies on other Liftcast crates.

pub mod athlete;
pub mod clock;
pub mod error;
mod lenient;
pub mod platform;
pub mod records;
pub mod types;

// Re-exports for convenience
pub use athlete::{parse_roster, Athlete, AthleteDirectory, AthleteState, RawAthlete, RosterEntry};
pub use clock::{Clock, ClockState, Remaining};
pub use error::ParseError;
pub use platform::{
    CurrentAthlete, JuryTicket, LiftType, Platform, PlatformState, JURY_DECISION_DURATION,
};
pub use records::{parse_records, RawRecords, Records};
pub use types::{
    BreakType, CeremonyType, Decision, FopState, JuryDecision, LiftTypeKey, Mode, RecordKind,
    RefereeDecisions, Session,
};
