use serde::Deserialize;

use liftcast_core::{Decision, FopState, JuryDecision, Mode, RecordKind, RefereeDecisions};

use crate::error::IngestError;
use crate::hub::{Hub, Published};
use crate::ingest::fields;

/// `POST /decision` form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub fop: Option<String>,
    pub decision_event_type: Option<String>,
    /// Left referee.
    pub d1: Option<String>,
    /// Center referee.
    pub d2: Option<String>,
    /// Right referee.
    pub d3: Option<String>,
    pub down: Option<String>,
    pub jury_decision: Option<String>,
    pub jury_reversal: Option<String>,
    pub wait_for_announcer: Option<String>,
    pub fop_state: Option<String>,
    pub mode: Option<String>,
    pub record_kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecisionEvent {
    DownSignal,
    FullDecision,
    JuryDecision,
    Reset,
    StartDeliberation,
}

impl DecisionEvent {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "DOWN_SIGNAL" => Some(Self::DownSignal),
            "FULL_DECISION" => Some(Self::FullDecision),
            "JURY_DECISION" => Some(Self::JuryDecision),
            "RESET" => Some(Self::Reset),
            "START_DELIBERATION" => Some(Self::StartDeliberation),
            _ => None,
        }
    }
}

const GOOD_LIFT: &str = "GOOD_LIFT";

impl Hub {
    /// Apply a referee/jury event.
    ///
    /// Handled events also carry the resulting fop state, mode and record
    /// kind. Deliberation starts, jury decisions held for the announcer and
    /// unknown tags change nothing.
    pub fn handle_decision(&self, payload: DecisionPayload) -> Result<Published, IngestError> {
        let name = fields::platform_name("fop", payload.fop.as_deref())?;
        tracing::debug!(platform = %name, ?payload, "Decision event");

        let tag = payload.decision_event_type.as_deref().unwrap_or_default();
        let Some(event) = DecisionEvent::parse(tag) else {
            tracing::warn!(platform = %name, event = tag, "Unhandled decision event");
            return Ok(self.apply(&name, |_| {}));
        };

        let fop_state = fields::known::<FopState>("fopState", payload.fop_state.as_deref());
        let mode = fields::known::<Mode>("mode", payload.mode.as_deref());
        let record_kind = fields::known::<RecordKind>("recordKind", payload.record_kind.as_deref());

        Ok(self.apply(&name, |platform| {
            match event {
                DecisionEvent::DownSignal => {
                    platform.set_down_signal(fields::flag(payload.down.as_deref()));
                }
                DecisionEvent::FullDecision => {
                    platform.set_decisions(RefereeDecisions {
                        left: fields::referee(payload.d1.as_deref()),
                        center: fields::referee(payload.d2.as_deref()),
                        right: fields::referee(payload.d3.as_deref()),
                    });
                }
                DecisionEvent::JuryDecision => {
                    if fields::flag(payload.wait_for_announcer.as_deref()) {
                        tracing::debug!(platform = %name, "Jury decision held for announcer");
                        return;
                    }
                    let decision = if payload.jury_decision.as_deref() == Some(GOOD_LIFT) {
                        Decision::Good
                    } else {
                        Decision::Bad
                    };
                    platform.set_jury_decision(JuryDecision {
                        decision,
                        reversal: fields::flag(payload.jury_reversal.as_deref()),
                    });
                }
                DecisionEvent::Reset => platform.reset_decisions(),
                // Its visible effects arrive through the next update.
                DecisionEvent::StartDeliberation => return,
            }

            if let Some(fop_state) = fop_state {
                platform.set_fop_state(fop_state);
            }
            if let Some(mode) = mode {
                platform.set_mode(mode);
            }
            platform.set_record_kind(record_kind);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::Channel;

    fn payload(event: &str) -> DecisionPayload {
        DecisionPayload {
            fop: Some("A".to_string()),
            decision_event_type: Some(event.to_string()),
            fop_state: Some("DECISION_VISIBLE".to_string()),
            mode: Some("LIFTING".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_decision_maps_referees() {
        let hub = Hub::default();
        let published = hub
            .handle_decision(DecisionPayload {
                d1: Some("true".to_string()),
                d2: Some("false".to_string()),
                d3: None,
                record_kind: Some("new".to_string()),
                ..payload("FULL_DECISION")
            })
            .unwrap();
        assert!(published.status);

        let state = hub.status("A");
        assert_eq!(state.left_referee, Some(Decision::Good));
        assert_eq!(state.center_referee, Some(Decision::Bad));
        assert_eq!(state.right_referee, None);
        assert_eq!(state.fop_state, FopState::DecisionVisible);
        assert_eq!(state.mode, Mode::Lifting);
        assert_eq!(state.record_kind, RecordKind::New);
    }

    #[tokio::test]
    async fn test_down_signal_then_full_decision() {
        let hub = Hub::default();
        hub.handle_decision(DecisionPayload {
            d1: Some("true".to_string()),
            d2: Some("true".to_string()),
            d3: Some("true".to_string()),
            ..payload("FULL_DECISION")
        })
        .unwrap();
        hub.handle_decision(DecisionPayload {
            down: Some("true".to_string()),
            ..payload("DOWN_SIGNAL")
        })
        .unwrap();

        let state = hub.status("A");
        assert!(state.down_signal);
        assert!(state.left_referee.is_none() && state.center_referee.is_none());

        hub.handle_decision(DecisionPayload {
            d2: Some("false".to_string()),
            ..payload("FULL_DECISION")
        })
        .unwrap();
        let state = hub.status("A");
        assert!(!state.down_signal);
        assert_eq!(state.center_referee, Some(Decision::Bad));
    }

    #[tokio::test]
    async fn test_jury_decision() {
        let hub = Hub::default();
        hub.handle_decision(DecisionPayload {
            jury_decision: Some("GOOD_LIFT".to_string()),
            jury_reversal: Some("true".to_string()),
            ..payload("JURY_DECISION")
        })
        .unwrap();

        let state = hub.status("A");
        assert_eq!(state.jury_decision, Some(Decision::Good));
        assert_eq!(state.jury_reversal, Some(true));
    }

    #[tokio::test]
    async fn test_jury_decision_held_for_announcer_is_discarded() {
        let hub = Hub::default();
        let mut status = hub.subscribe(Channel::Status, "A");
        status.frames.try_recv().unwrap();

        let published = hub
            .handle_decision(DecisionPayload {
                jury_decision: Some("BAD_LIFT".to_string()),
                wait_for_announcer: Some("true".to_string()),
                ..payload("JURY_DECISION")
            })
            .unwrap();

        assert!(!published.any());
        assert!(status.frames.try_recv().is_err());
        let state = hub.status("A");
        assert!(state.jury_decision.is_none());
        assert_eq!(state.fop_state, FopState::Inactive);
    }

    #[tokio::test]
    async fn test_start_deliberation_and_unknown_tags_change_nothing() {
        let hub = Hub::default();
        let published = hub.handle_decision(payload("START_DELIBERATION")).unwrap();
        assert!(!published.any());

        let published = hub.handle_decision(payload("SOMETHING_NEW")).unwrap();
        assert!(!published.any());

        let state = hub.status("A");
        assert_eq!(state.mode, Mode::Wait);
        assert_eq!(state.fop_state, FopState::Inactive);
    }

    #[tokio::test]
    async fn test_reset_clears_decisions() {
        let hub = Hub::default();
        hub.handle_decision(DecisionPayload {
            d1: Some("true".to_string()),
            ..payload("FULL_DECISION")
        })
        .unwrap();
        hub.handle_decision(payload("RESET")).unwrap();

        let state = hub.status("A");
        assert!(state.left_referee.is_none());
        assert!(!state.down_signal);
    }

    #[tokio::test]
    async fn test_missing_platform_is_rejected() {
        let hub = Hub::default();
        let result = hub.handle_decision(DecisionPayload {
            fop: None,
            ..payload("RESET")
        });
        assert!(matches!(result, Err(IngestError::MissingField("fop"))));
        assert!(hub.platforms().is_empty());
    }

    #[tokio::test]
    async fn test_platform_name_is_kept_verbatim() {
        let hub = Hub::default();
        let mut status = hub.subscribe(Channel::Status, "A ");
        status.frames.try_recv().unwrap();

        hub.handle_decision(DecisionPayload {
            fop: Some("A ".to_string()),
            down: Some("true".to_string()),
            ..payload("DOWN_SIGNAL")
        })
        .unwrap();

        assert_eq!(hub.platforms(), vec!["A ".to_string()]);
        assert!(hub.status("A ").down_signal);
        assert!(!hub.status("A").down_signal);
        let frame: serde_json::Value =
            serde_json::from_str(&status.frames.try_recv().unwrap()).unwrap();
        assert_eq!(frame["name"], "A ");
        assert_eq!(frame["downSignal"], true);
    }
}
