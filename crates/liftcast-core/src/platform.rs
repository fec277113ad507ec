//! Per-platform state machine.
//!
//! A [`Platform`] holds everything one field of play shows on its displays.
//! All mutators are synchronous and touch only `self`; callers are expected
//! to serialize access (see the hub crate). Reads return owned snapshots so
//! two of them can be compared with `==`.

use std::time::Duration;

use serde::Serialize;

use crate::athlete::{Athlete, AthleteDirectory, AthleteState, RosterEntry};
use crate::clock::{Clock, ClockState};
use crate::records::{RawRecords, Records};
use crate::types::{
    BreakType, CeremonyType, Decision, FopState, JuryDecision, LiftTypeKey, Mode, RecordKind,
    RefereeDecisions, Session,
};

/// How long a jury decision stays visible before it clears itself.
pub const JURY_DECISION_DURATION: Duration = Duration::from_millis(3_000);

/// Identifies one jury decision so that its expiry can tell whether a newer
/// decision has replaced it in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JuryTicket(u64);

/// Lift in progress: enum key plus the controller's display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiftType {
    pub key: Option<LiftTypeKey>,
    pub name: Option<String>,
}

/// Consolidated status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformState {
    pub name: String,
    pub mode: Mode,
    pub fop_state: FopState,
    pub break_type: Option<BreakType>,
    pub ceremony_type: Option<CeremonyType>,
    pub lift_type: Option<String>,
    pub lift_type_key: Option<LiftTypeKey>,
    pub center_referee: Option<Decision>,
    pub left_referee: Option<Decision>,
    pub right_referee: Option<Decision>,
    pub down_signal: bool,
    pub jury_decision: Option<Decision>,
    pub jury_reversal: Option<bool>,
    pub record_kind: RecordKind,
    pub records: Option<Records>,
    pub session_name: Option<String>,
    pub session_info: Option<String>,
    pub session_description: Option<String>,
    pub athlete: Option<AthleteState>,
    pub athlete_clock: ClockState,
    pub break_clock: ClockState,
}

/// The athlete on the platform together with their clock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentAthlete {
    pub athlete: Option<AthleteState>,
    pub clock: ClockState,
}

#[derive(Debug, Clone)]
pub struct Platform {
    name: String,
    athletes: AthleteDirectory,
    lifting_order: Vec<u32>,
    current_athlete: Option<u32>,
    leaders: Vec<AthleteState>,
    athlete_clock: Clock,
    break_clock: Clock,
    fop_state: FopState,
    mode: Mode,
    break_type: Option<BreakType>,
    ceremony_type: Option<CeremonyType>,
    lift_type: LiftType,
    referees: RefereeDecisions,
    down_signal: bool,
    jury: Option<JuryDecision>,
    jury_epoch: u64,
    pending_jury_expiry: Option<JuryTicket>,
    record_kind: RecordKind,
    records: Option<Records>,
    session: Session,
}

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            athletes: AthleteDirectory::new(),
            lifting_order: Vec::new(),
            current_athlete: None,
            leaders: Vec::new(),
            athlete_clock: Clock::new(),
            break_clock: Clock::new(),
            fop_state: FopState::Inactive,
            mode: Mode::Wait,
            break_type: None,
            ceremony_type: None,
            lift_type: LiftType::default(),
            referees: RefereeDecisions::default(),
            down_signal: false,
            jury: None,
            jury_epoch: 0,
            pending_jury_expiry: None,
            record_kind: RecordKind::None,
            records: None,
            session: Session::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_break_type(&mut self, break_type: Option<BreakType>) {
        self.break_type = break_type;
    }

    pub fn set_ceremony_type(&mut self, ceremony_type: Option<CeremonyType>) {
        self.ceremony_type = ceremony_type;
    }

    pub fn set_fop_state(&mut self, fop_state: FopState) {
        self.fop_state = fop_state;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Point at an athlete by start number. Unknown numbers clear the
    /// current athlete instead of failing.
    pub fn set_current_athlete(&mut self, start_number: Option<u32>) {
        self.current_athlete = start_number.filter(|n| self.athletes.contains(*n));
    }

    /// Replace all three referee decisions. Always lowers the down signal.
    pub fn set_decisions(&mut self, decisions: RefereeDecisions) {
        self.down_signal = false;
        self.referees = decisions;
    }

    /// Raising the down signal wipes the referee decisions.
    pub fn set_down_signal(&mut self, down: bool) {
        self.down_signal = down;
        if down {
            self.referees = RefereeDecisions::default();
        }
    }

    /// Clear referee decisions and the down signal. Jury state is untouched.
    pub fn reset_decisions(&mut self) {
        self.referees = RefereeDecisions::default();
        self.down_signal = false;
    }

    /// Show a jury decision and request its expiry.
    ///
    /// The returned ticket is also queued for [`Platform::take_jury_expiry`];
    /// whoever drives the platform schedules [`Platform::expire_jury`] after
    /// [`JURY_DECISION_DURATION`]. A later decision invalidates earlier tickets.
    pub fn set_jury_decision(&mut self, jury: JuryDecision) -> JuryTicket {
        self.jury = Some(jury);
        self.jury_epoch += 1;
        let ticket = JuryTicket(self.jury_epoch);
        self.pending_jury_expiry = Some(ticket);
        ticket
    }

    /// Take the expiry requested by the last jury decision, if any.
    pub fn take_jury_expiry(&mut self) -> Option<JuryTicket> {
        self.pending_jury_expiry.take()
    }

    /// Clear the jury decision if `ticket` still belongs to the one shown.
    /// Returns whether anything was cleared.
    pub fn expire_jury(&mut self, ticket: JuryTicket) -> bool {
        if ticket.0 != self.jury_epoch || self.jury.is_none() {
            return false;
        }
        self.jury = None;
        true
    }

    pub fn set_lift_type(&mut self, lift_type: LiftType) {
        self.lift_type = lift_type;
    }

    pub fn set_record_kind(&mut self, kind: Option<RecordKind>) {
        self.record_kind = kind.unwrap_or_default();
    }

    pub fn set_records(&mut self, records: Option<RawRecords>) {
        self.records = records.map(Records::from);
    }

    /// Replace the session descriptor. Empty strings are stored as absent.
    pub fn set_session(&mut self, session: Session) {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());
        self.session = Session {
            name: non_empty(session.name),
            info: non_empty(session.info),
            description: non_empty(session.description),
        };
    }

    /// Upsert every competitor and rebuild the lifting order in the order
    /// received. Spacer rows are skipped.
    pub fn update_athletes(&mut self, roster: Vec<RosterEntry>) {
        self.lifting_order = roster
            .into_iter()
            .filter_map(RosterEntry::into_athlete)
            .map(|raw| self.athletes.upsert(raw))
            .collect();
    }

    /// Replace the leaderboard. Leaders are not added to the directory.
    pub fn set_leaders(&mut self, roster: Vec<RosterEntry>) {
        self.leaders = roster
            .into_iter()
            .filter_map(RosterEntry::into_athlete)
            .map(|raw| Athlete::new(raw).state())
            .collect();
    }

    pub fn athlete_clock(&self) -> &Clock {
        &self.athlete_clock
    }

    pub fn athlete_clock_mut(&mut self) -> &mut Clock {
        &mut self.athlete_clock
    }

    pub fn break_clock(&self) -> &Clock {
        &self.break_clock
    }

    pub fn break_clock_mut(&mut self) -> &mut Clock {
        &mut self.break_clock
    }

    pub fn current_athlete(&self) -> Option<AthleteState> {
        self.current_athlete
            .and_then(|n| self.athletes.get(n))
            .map(Athlete::state)
    }

    pub fn current_athlete_with_clock(&self) -> CurrentAthlete {
        CurrentAthlete {
            athlete: self.current_athlete(),
            clock: self.athlete_clock.state(),
        }
    }

    /// Athletes in lifting order.
    pub fn lifting_order(&self) -> Vec<AthleteState> {
        self.lifting_order
            .iter()
            .filter_map(|n| self.athletes.get(*n))
            .map(Athlete::state)
            .collect()
    }

    pub fn leaders(&self) -> Vec<AthleteState> {
        self.leaders.clone()
    }

    pub fn state(&self) -> PlatformState {
        PlatformState {
            name: self.name.clone(),
            mode: self.mode,
            fop_state: self.fop_state,
            break_type: self.break_type,
            ceremony_type: self.ceremony_type,
            lift_type: self.lift_type.name.clone(),
            lift_type_key: self.lift_type.key,
            center_referee: self.referees.center,
            left_referee: self.referees.left,
            right_referee: self.referees.right,
            down_signal: self.down_signal,
            jury_decision: self.jury.map(|j| j.decision),
            jury_reversal: self.jury.map(|j| j.reversal),
            record_kind: self.record_kind,
            records: self.records.clone(),
            session_name: self.session.name.clone(),
            session_info: self.session.info.clone(),
            session_description: self.session.description.clone(),
            athlete: self.current_athlete(),
            athlete_clock: self.athlete_clock.state(),
            break_clock: self.break_clock.state(),
        }
    }
}
