use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

/// Key the controller sets on placeholder rows in a running order.
const SPACER_KEY: &str = "isSpacer";

/// One attempt cell as sent by the controller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttempt {
    #[serde(default, deserialize_with = "lenient::string")]
    pub lift_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub string_value: Option<String>,
}

/// An athlete row as sent by the controller. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAthlete {
    #[serde(deserialize_with = "lenient::start_number")]
    pub start_number: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub team_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub year_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub sub_category: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub group: Option<String>,
    #[serde(default, rename = "flagURL", deserialize_with = "lenient::string")]
    pub flag_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub sattempts: Vec<RawAttempt>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cattempts: Vec<RawAttempt>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub best_snatch: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub best_clean_jerk: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub total: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub snatch_rank: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub clean_jerk_rank: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub total_rank: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub classname: Option<String>,
}

/// One row of a running order: a real competitor or a visual gap.
#[derive(Debug, Clone)]
pub enum RosterEntry {
    Athlete(RawAthlete),
    Spacer,
}

impl RosterEntry {
    pub fn into_athlete(self) -> Option<RawAthlete> {
        match self {
            RosterEntry::Athlete(raw) => Some(raw),
            RosterEntry::Spacer => None,
        }
    }
}

/// Parse a running-order list.
///
/// A row is a spacer when it carries the `isSpacer` key at all. Every other
/// row must be a valid athlete; one bad row fails the whole list. A JSON
/// `null` document is an empty list.
pub fn parse_roster(json: &str) -> Result<Vec<RosterEntry>, serde_json::Error> {
    let rows: Option<Vec<Value>> = serde_json::from_str(json)?;
    rows.unwrap_or_default()
        .into_iter()
        .map(|row| {
            if is_spacer(&row) {
                Ok(RosterEntry::Spacer)
            } else {
                serde_json::from_value(row).map(RosterEntry::Athlete)
            }
        })
        .collect()
}

fn is_spacer(row: &Value) -> bool {
    row.as_object()
        .is_some_and(|fields| fields.contains_key(SPACER_KEY))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptState {
    pub status: Option<String>,
    pub weight: Option<u32>,
}

impl From<&RawAttempt> for AttemptState {
    fn from(raw: &RawAttempt) -> Self {
        Self {
            status: raw.lift_status.clone(),
            weight: raw.string_value.as_deref().and_then(lenient::weight),
        }
    }
}

/// Normalized athlete record handed to display clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AthleteState {
    pub start_number: u32,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub team: Option<String>,
    pub year_of_birth: Option<String>,
    pub gender: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub group: Option<String>,
    pub flag_url: Option<String>,
    pub snatch_attempts: Vec<AttemptState>,
    pub clean_jerk_attempts: Vec<AttemptState>,
    pub best_snatch: Option<String>,
    pub best_clean_jerk: Option<String>,
    pub total: Option<String>,
    pub snatch_rank: Option<String>,
    pub clean_jerk_rank: Option<String>,
    pub total_rank: Option<String>,
    pub classname: Option<String>,
}

impl From<RawAthlete> for AthleteState {
    fn from(raw: RawAthlete) -> Self {
        Self {
            start_number: raw.start_number,
            snatch_attempts: raw.sattempts.iter().map(AttemptState::from).collect(),
            clean_jerk_attempts: raw.cattempts.iter().map(AttemptState::from).collect(),
            full_name: raw.full_name,
            first_name: raw.first_name,
            last_name: raw.last_name,
            team: raw.team_name,
            year_of_birth: raw.year_of_birth,
            gender: raw.gender,
            category: raw.category,
            sub_category: raw.sub_category,
            group: raw.group,
            flag_url: raw.flag_url,
            best_snatch: raw.best_snatch,
            best_clean_jerk: raw.best_clean_jerk,
            total: raw.total,
            snatch_rank: raw.snatch_rank,
            clean_jerk_rank: raw.clean_jerk_rank,
            total_rank: raw.total_rank,
            classname: raw.classname,
        }
    }
}

/// A competitor known to a platform.
#[derive(Debug, Clone)]
pub struct Athlete {
    state: AthleteState,
}

impl Athlete {
    pub fn new(raw: RawAthlete) -> Self {
        Self { state: raw.into() }
    }

    /// Replace this athlete's data with a newer sighting.
    pub fn update(&mut self, raw: RawAthlete) {
        self.state = raw.into();
    }

    pub fn state(&self) -> AthleteState {
        self.state.clone()
    }
}

/// Athletes seen on one platform, keyed by start number.
///
/// Entries are never removed: a platform keeps every athlete it has seen
/// for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct AthleteDirectory {
    athletes: HashMap<u32, Athlete>,
}

impl AthleteDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new athlete or update an existing one in place.
    /// Returns the start number the entry is stored under.
    pub fn upsert(&mut self, raw: RawAthlete) -> u32 {
        let start_number = raw.start_number;
        match self.athletes.get_mut(&start_number) {
            Some(athlete) => athlete.update(raw),
            None => {
                self.athletes.insert(start_number, Athlete::new(raw));
            }
        }
        start_number
    }

    pub fn get(&self, start_number: u32) -> Option<&Athlete> {
        self.athletes.get(&start_number)
    }

    pub fn contains(&self, start_number: u32) -> bool {
        self.athletes.contains_key(&start_number)
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }
}
