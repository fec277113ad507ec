use serde::Deserialize;

use liftcast_core::{
    parse_records, parse_roster, BreakType, CeremonyType, FopState, LiftType, LiftTypeKey, Mode,
    RawRecords, RecordKind, RosterEntry, Session,
};

use crate::error::IngestError;
use crate::hub::{Hub, Published};
use crate::ingest::fields;

/// `POST /update` form body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub fop: Option<String>,
    pub fop_state: Option<String>,
    pub mode: Option<String>,
    pub record_kind: Option<String>,
    pub lift_type_key: Option<String>,
    pub lift_type: Option<String>,
    pub break_type: Option<String>,
    pub ceremony_type: Option<String>,
    pub group_name: Option<String>,
    pub group_info: Option<String>,
    pub group_description: Option<String>,
    pub start_number: Option<String>,
    /// Leaderboard, as a JSON athlete list.
    pub leaders: Option<String>,
    /// Record board, as a JSON wide table.
    pub records: Option<String>,
    /// Upcoming lifters in order, as a JSON athlete list.
    pub lifting_order_athletes: Option<String>,
    // Sent by the controller but not displayed.
    pub attempt_number: Option<String>,
    pub group_athletes: Option<String>,
    pub translation_map: Option<String>,
}

/// Everything an update will apply, fully parsed before the platform is
/// touched.
#[derive(Debug)]
struct UpdateBatch {
    break_type: Option<BreakType>,
    ceremony_type: Option<CeremonyType>,
    fop_state: Option<FopState>,
    mode: Option<Mode>,
    record_kind: Option<RecordKind>,
    lift_type: LiftType,
    session: Session,
    start_number: Option<u32>,
    leaders: Vec<RosterEntry>,
    records: Option<RawRecords>,
    lifting_order: Vec<RosterEntry>,
}

/// Parse an embedded JSON field. Absent or blank text parses as the empty
/// value.
fn embedded<T: Default>(
    field: &'static str,
    value: Option<&str>,
    parse: impl FnOnce(&str) -> Result<T, serde_json::Error>,
) -> Result<T, IngestError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(T::default()),
        Some(json) => parse(json).map_err(|source| IngestError::MalformedJson { field, source }),
    }
}

fn lift_type(key: Option<&str>, name: Option<&str>) -> LiftType {
    let key = key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .and_then(|k| match LiftTypeKey::from_wire(k) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!(field = "liftTypeKey", "Ignoring value: {}", e);
                None
            }
        });
    LiftType {
        key,
        name: fields::text(name),
    }
}

/// The leading integer of the field, so `"7.0"` still names athlete 7.
fn start_number(value: Option<&str>) -> Option<u32> {
    let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
    let digits = raw
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw, |end| &raw[..end]);
    match digits.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(value = raw, "Ignoring malformed startNumber");
            None
        }
    }
}

impl UpdateBatch {
    fn parse(payload: &UpdatePayload) -> Result<Self, IngestError> {
        Ok(Self {
            leaders: embedded("leaders", payload.leaders.as_deref(), parse_roster)?,
            records: embedded("records", payload.records.as_deref(), parse_records)?,
            lifting_order: embedded(
                "liftingOrderAthletes",
                payload.lifting_order_athletes.as_deref(),
                parse_roster,
            )?,
            break_type: fields::known("breakType", payload.break_type.as_deref()),
            ceremony_type: fields::known("ceremonyType", payload.ceremony_type.as_deref()),
            fop_state: fields::known("fopState", payload.fop_state.as_deref()),
            mode: fields::known("mode", payload.mode.as_deref()),
            record_kind: fields::known("recordKind", payload.record_kind.as_deref()),
            lift_type: lift_type(
                payload.lift_type_key.as_deref(),
                payload.lift_type.as_deref(),
            ),
            session: Session {
                name: fields::text(payload.group_name.as_deref()),
                info: fields::text(payload.group_info.as_deref()),
                description: fields::text(payload.group_description.as_deref()),
            },
            start_number: start_number(payload.start_number.as_deref()),
        })
    }
}

impl Hub {
    /// Apply a full session refresh.
    ///
    /// All embedded JSON is parsed first; if any of it is malformed nothing
    /// is applied and nothing is broadcast.
    pub fn handle_update(&self, payload: UpdatePayload) -> Result<Published, IngestError> {
        let name = fields::platform_name("fop", payload.fop.as_deref())?;
        let len = |blob: &Option<String>| blob.as_ref().map_or(0, String::len);
        tracing::debug!(
            platform = %name,
            fop_state = ?payload.fop_state,
            mode = ?payload.mode,
            start_number = ?payload.start_number,
            leaders_bytes = len(&payload.leaders),
            records_bytes = len(&payload.records),
            lifting_order_bytes = len(&payload.lifting_order_athletes),
            "Update event"
        );

        let batch = UpdateBatch::parse(&payload)?;
        tracing::debug!(
            platform = %name,
            lifters = batch.lifting_order.len(),
            leaders = batch.leaders.len(),
            "Parsed update"
        );

        Ok(self.apply(&name, move |platform| {
            platform.set_break_type(batch.break_type);
            platform.set_ceremony_type(batch.ceremony_type);
            if let Some(fop_state) = batch.fop_state {
                platform.set_fop_state(fop_state);
            }
            platform.set_leaders(batch.leaders);
            platform.set_lift_type(batch.lift_type);
            if let Some(mode) = batch.mode {
                platform.set_mode(mode);
            }
            platform.set_record_kind(batch.record_kind);
            platform.set_records(batch.records);
            platform.set_session(batch.session);
            // The current athlete resolves against the refreshed directory.
            platform.update_athletes(batch.lifting_order);
            platform.set_current_athlete(batch.start_number);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::Channel;

    const ORDER: &str = r#"[
        {"startNumber": "7", "fullName": "DOE, Jane", "teamName": "Oslo",
         "sattempts": [{"liftStatus": "current", "stringValue": "85"}]},
        {"isSpacer": true},
        {"startNumber": 3, "fullName": "ROE, Ann"}
    ]"#;

    fn payload() -> UpdatePayload {
        UpdatePayload {
            fop: Some("A".to_string()),
            fop_state: Some("CURRENT_ATHLETE_DISPLAYED".to_string()),
            mode: Some("CURRENT_ATHLETE".to_string()),
            lift_type_key: Some("Snatch".to_string()),
            lift_type: Some("Snatch".to_string()),
            group_name: Some("M1".to_string()),
            group_info: Some("Men 61kg".to_string()),
            group_description: Some(String::new()),
            start_number: Some("7".to_string()),
            lifting_order_athletes: Some(ORDER.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_applies_everything() {
        let hub = Hub::default();
        let published = hub.handle_update(payload()).unwrap();
        assert!(published.status && published.lifting_order);

        let state = hub.status("A");
        assert_eq!(state.mode, Mode::CurrentAthlete);
        assert_eq!(state.fop_state, FopState::CurrentAthleteDisplayed);
        assert_eq!(state.lift_type_key, Some(LiftTypeKey::Snatch));
        assert_eq!(state.lift_type.as_deref(), Some("Snatch"));
        assert_eq!(state.session_name.as_deref(), Some("M1"));
        assert_eq!(state.session_info.as_deref(), Some("Men 61kg"));
        assert!(state.session_description.is_none());
        assert_eq!(state.athlete.map(|a| a.start_number), Some(7));

        let order: Vec<u32> = hub
            .lifting_order("A")
            .into_iter()
            .map(|a| a.start_number)
            .collect();
        assert_eq!(order, vec![7, 3]);
    }

    #[tokio::test]
    async fn test_repeated_update_is_silent() {
        let hub = Hub::default();
        hub.handle_update(payload()).unwrap();

        let mut status = hub.subscribe(Channel::Status, "A");
        let mut order = hub.subscribe(Channel::LiftingOrder, "A");
        status.frames.try_recv().unwrap();
        order.frames.try_recv().unwrap();

        let published = hub.handle_update(payload()).unwrap();
        assert!(!published.any());
        assert!(status.frames.try_recv().is_err());
        assert!(order.frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_json_fails_whole_update() {
        let hub = Hub::default();
        hub.handle_update(payload()).unwrap();
        let mut status = hub.subscribe(Channel::Status, "A");
        status.frames.try_recv().unwrap();

        let result = hub.handle_update(UpdatePayload {
            mode: Some("LIFTING".to_string()),
            lifting_order_athletes: Some(r#"[{"startNumber": 1}]"#.to_string()),
            records: Some("{not json".to_string()),
            ..payload()
        });

        assert!(matches!(
            result,
            Err(IngestError::MalformedJson {
                field: "records",
                ..
            })
        ));
        assert_eq!(hub.status("A").mode, Mode::CurrentAthlete);
        assert_eq!(hub.lifting_order("A").len(), 2);
        assert!(status.frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_update_does_not_register_platform() {
        let hub = Hub::default();
        let result = hub.handle_update(UpdatePayload {
            leaders: Some("[".to_string()),
            ..payload()
        });
        assert!(matches!(
            result,
            Err(IngestError::MalformedJson {
                field: "leaders",
                ..
            })
        ));
        assert!(hub.platforms().is_empty());
    }

    #[tokio::test]
    async fn test_leaders_are_stored_but_not_broadcast() {
        let hub = Hub::default();
        hub.handle_update(payload()).unwrap();
        let mut status = hub.subscribe(Channel::Status, "A");
        let mut order = hub.subscribe(Channel::LiftingOrder, "A");
        status.frames.try_recv().unwrap();
        order.frames.try_recv().unwrap();

        let published = hub
            .handle_update(UpdatePayload {
                leaders: Some(r#"[{"startNumber": 12, "fullName": "POE, Al"}]"#.to_string()),
                ..payload()
            })
            .unwrap();
        assert!(!published.any());

        let leaders = hub.leaders("A");
        assert_eq!(leaders.len(), 1);
        assert_eq!(leaders[0].start_number, 12);
        // Leaders never enter the lifting order directory.
        assert_eq!(hub.lifting_order("A").len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_start_number_clears_current_athlete() {
        let hub = Hub::default();
        hub.handle_update(payload()).unwrap();
        hub.handle_update(UpdatePayload {
            start_number: Some("99".to_string()),
            ..payload()
        })
        .unwrap();
        assert!(hub.status("A").athlete.is_none());
        assert!(hub.current_athlete("A").athlete.is_none());
    }

    #[tokio::test]
    async fn test_null_records_clear_the_board() {
        let hub = Hub::default();
        hub.handle_update(UpdatePayload {
            records: Some("null".to_string()),
            lifting_order_athletes: Some("null".to_string()),
            ..payload()
        })
        .unwrap();
        let state = hub.status("A");
        assert!(state.records.is_none());
        assert!(hub.lifting_order("A").is_empty());
    }

    #[test]
    fn test_lift_type_key_casing() {
        let lift = lift_type(Some("Clean_and_Jerk"), Some("Clean & Jerk"));
        assert_eq!(lift.key, Some(LiftTypeKey::CleanAndJerk));
        assert_eq!(lift.name.as_deref(), Some("Clean & Jerk"));
        assert_eq!(lift_type(Some("Deadlift"), None), LiftType::default());
    }

    #[test]
    fn test_start_number_reads_leading_integer() {
        assert_eq!(start_number(Some("7")), Some(7));
        assert_eq!(start_number(Some(" 12 ")), Some(12));
        assert_eq!(start_number(Some("7.0")), Some(7));
        assert_eq!(start_number(Some("15abc")), Some(15));
        assert_eq!(start_number(Some("-3")), None);
        assert_eq!(start_number(Some("none")), None);
        assert_eq!(start_number(None), None);
    }

    #[tokio::test]
    async fn test_fractional_start_number_keeps_current_athlete() {
        let hub = Hub::default();
        hub.handle_update(UpdatePayload {
            start_number: Some("7.0".to_string()),
            ..payload()
        })
        .unwrap();
        assert_eq!(hub.status("A").athlete.map(|a| a.start_number), Some(7));
    }
}
