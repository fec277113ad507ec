use serde::Deserialize;

use liftcast_core::{BreakType, CeremonyType, ClockState, FopState, Mode, Remaining};

use crate::error::IngestError;
use crate::hub::{Hub, Published};
use crate::ingest::fields;

/// `POST /timer` form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerPayload {
    pub fop_name: Option<String>,
    pub fop_state: Option<String>,
    pub mode: Option<String>,
    pub break_type: Option<String>,
    pub ceremony_type: Option<String>,
    pub break_timer_event_type: Option<String>,
    pub break_millis_remaining: Option<String>,
    pub indefinite_break: Option<String>,
    pub athlete_timer_event_type: Option<String>,
    pub athlete_millis_remaining: Option<String>,
}

const BREAK_STARTED: &str = "BreakStarted";
const ATHLETE_TIMER_STARTED: &str = "StartTime";

impl TimerPayload {
    /// New break clock, if the event carries a break timer sub-event.
    ///
    /// A break is indefinite unless the controller explicitly says otherwise
    /// and sends a usable duration. A break that ended arrives without the
    /// flag and so reads as indefinite.
    fn break_clock(&self) -> Option<ClockState> {
        let event = self
            .break_timer_event_type
            .as_deref()
            .filter(|e| !e.is_empty())?;

        let indefinite = self
            .indefinite_break
            .as_deref()
            .map_or(true, |flag| flag == "true");
        let remaining = if indefinite {
            Remaining::Indefinite
        } else {
            fields::millis("breakMillisRemaining", self.break_millis_remaining.as_deref())
                .map_or(Remaining::Indefinite, Remaining::Finite)
        };

        Some(ClockState::new(event != BREAK_STARTED, remaining))
    }

    /// New athlete clock, if the event carries an athlete timer sub-event.
    fn athlete_clock(&self) -> Option<ClockState> {
        let event = self
            .athlete_timer_event_type
            .as_deref()
            .filter(|e| !e.is_empty())?;

        let millis = fields::millis(
            "athleteMillisRemaining",
            self.athlete_millis_remaining.as_deref(),
        )
        .unwrap_or_else(|| {
            tracing::warn!(event, "Athlete timer event without remaining time, using 0");
            0
        });

        Some(ClockState::new(
            event != ATHLETE_TIMER_STARTED,
            Remaining::Finite(millis),
        ))
    }
}

impl Hub {
    /// Apply a clock event. Break/ceremony type, fop state and mode are
    /// always applied; each clock only when its sub-event is present.
    pub fn handle_timer(&self, payload: TimerPayload) -> Result<Published, IngestError> {
        let name = fields::platform_name("fopName", payload.fop_name.as_deref())?;
        tracing::debug!(platform = %name, ?payload, "Timer event");

        let break_type = fields::known::<BreakType>("breakType", payload.break_type.as_deref());
        let ceremony_type =
            fields::known::<CeremonyType>("ceremonyType", payload.ceremony_type.as_deref());
        let fop_state = fields::known::<FopState>("fopState", payload.fop_state.as_deref());
        let mode = fields::known::<Mode>("mode", payload.mode.as_deref());
        let break_clock = payload.break_clock();
        let athlete_clock = payload.athlete_clock();

        Ok(self.apply(&name, |platform| {
            platform.set_break_type(break_type);
            platform.set_ceremony_type(ceremony_type);
            if let Some(fop_state) = fop_state {
                platform.set_fop_state(fop_state);
            }
            if let Some(mode) = mode {
                platform.set_mode(mode);
            }
            if let Some(clock) = break_clock {
                platform.break_clock_mut().update(clock);
            }
            if let Some(clock) = athlete_clock {
                platform.athlete_clock_mut().update(clock);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> TimerPayload {
        TimerPayload {
            fop_name: Some("A".to_string()),
            fop_state: Some("BREAK".to_string()),
            mode: Some("FIRST_SNATCH".to_string()),
            break_type: Some("FIRST_SNATCH".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_running_break_with_duration() {
        let hub = Hub::default();
        hub.handle_timer(TimerPayload {
            break_timer_event_type: Some("BreakStarted".to_string()),
            break_millis_remaining: Some("600000".to_string()),
            indefinite_break: Some("false".to_string()),
            ..payload()
        })
        .unwrap();

        let state = hub.status("A");
        assert_eq!(state.break_type, Some(BreakType::FirstSnatch));
        assert_eq!(state.fop_state, FopState::Break);
        assert_eq!(state.mode, Mode::FirstSnatch);
        assert_eq!(
            hub.break_clock("A"),
            ClockState::new(false, Remaining::Finite(600_000))
        );
    }

    #[tokio::test]
    async fn test_break_without_flag_is_indefinite() {
        let hub = Hub::default();
        hub.handle_timer(TimerPayload {
            break_timer_event_type: Some("BreakDone".to_string()),
            break_millis_remaining: Some("0".to_string()),
            ..payload()
        })
        .unwrap();
        assert_eq!(
            hub.break_clock("A"),
            ClockState::new(true, Remaining::Indefinite)
        );

        hub.handle_timer(TimerPayload {
            break_timer_event_type: Some("BreakStarted".to_string()),
            indefinite_break: Some("true".to_string()),
            break_millis_remaining: Some("5000".to_string()),
            ..payload()
        })
        .unwrap();
        assert_eq!(
            hub.break_clock("A"),
            ClockState::new(false, Remaining::Indefinite)
        );
    }

    #[tokio::test]
    async fn test_not_indefinite_without_duration_stays_indefinite() {
        let hub = Hub::default();
        hub.handle_timer(TimerPayload {
            break_timer_event_type: Some("BreakPaused".to_string()),
            indefinite_break: Some("false".to_string()),
            ..payload()
        })
        .unwrap();
        assert_eq!(
            hub.break_clock("A"),
            ClockState::new(true, Remaining::Indefinite)
        );
    }

    #[tokio::test]
    async fn test_athlete_timer_start_and_stop() {
        let hub = Hub::default();
        let athlete = |event: &str, ms: &str| TimerPayload {
            fop_name: Some("A".to_string()),
            fop_state: Some("TIME_RUNNING".to_string()),
            mode: Some("LIFTING".to_string()),
            athlete_timer_event_type: Some(event.to_string()),
            athlete_millis_remaining: Some(ms.to_string()),
            ..Default::default()
        };

        hub.handle_timer(athlete("StartTime", "60000")).unwrap();
        assert_eq!(
            hub.athlete_clock("A"),
            ClockState::new(false, Remaining::Finite(60_000))
        );

        hub.handle_timer(athlete("StopTime", "41250")).unwrap();
        assert_eq!(
            hub.athlete_clock("A"),
            ClockState::new(true, Remaining::Finite(41_250))
        );
        assert_eq!(hub.break_clock("A"), ClockState::default());
    }

    #[tokio::test]
    async fn test_missing_break_type_clears_it() {
        let hub = Hub::default();
        hub.handle_timer(payload()).unwrap();
        assert!(hub.status("A").break_type.is_some());

        hub.handle_timer(TimerPayload {
            break_type: None,
            ceremony_type: Some("MEDALS".to_string()),
            ..payload()
        })
        .unwrap();
        let state = hub.status("A");
        assert!(state.break_type.is_none());
        assert_eq!(state.ceremony_type, Some(CeremonyType::Medals));
    }

    #[tokio::test]
    async fn test_missing_platform_name() {
        let hub = Hub::default();
        let result = hub.handle_timer(TimerPayload::default());
        assert!(matches!(result, Err(IngestError::MissingField("fopName"))));
    }
}
