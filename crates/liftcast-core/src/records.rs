//! Record board reshaping.
//!
//! The controller sends records as a wide table: one row per category, with
//! one positional cell per federation. Displays want each cell labelled with
//! its federation and the highlight strings turned into flags.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::lenient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFederationRecords {
    #[serde(default, rename = "SNATCH", deserialize_with = "lenient::number")]
    pub snatch: Option<Number>,
    #[serde(default, rename = "CLEANJERK", deserialize_with = "lenient::number")]
    pub clean_jerk: Option<Number>,
    #[serde(default, rename = "TOTAL", deserialize_with = "lenient::number")]
    pub total: Option<Number>,
    #[serde(default, rename = "snatchHighlight", deserialize_with = "lenient::string")]
    pub snatch_highlight: Option<String>,
    #[serde(default, rename = "cjHighlight", deserialize_with = "lenient::string")]
    pub clean_jerk_highlight: Option<String>,
    #[serde(default, rename = "totalHighlight", deserialize_with = "lenient::string")]
    pub total_highlight: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategoryRecords {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cat: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub records: Vec<RawFederationRecords>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecords {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub record_categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub record_names: Vec<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub record_table: Vec<RawCategoryRecords>,
}

/// Parse the embedded records document. A JSON `null` yields `None`.
pub fn parse_records(json: &str) -> Result<Option<RawRecords>, serde_json::Error> {
    serde_json::from_str(json)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFederationRecords {
    pub federation: String,
    pub snatch: Option<Number>,
    pub clean: Option<Number>,
    pub total: Option<Number>,
    pub snatch_attempt: bool,
    pub clean_attempt: bool,
    pub total_attempt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecords {
    pub category: Vec<String>,
    pub data: Vec<CategoryFederationRecords>,
}

/// Normalized record board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Records {
    pub federations: Vec<String>,
    pub categories: Vec<String>,
    pub records: Vec<CategoryRecords>,
}

impl From<RawRecords> for Records {
    fn from(raw: RawRecords) -> Self {
        let federations = raw.record_names;
        let records = raw
            .record_table
            .into_iter()
            .map(|row| CategoryRecords {
                category: row.cat,
                data: row
                    .records
                    .into_iter()
                    .enumerate()
                    .map(|(index, cell)| CategoryFederationRecords {
                        federation: federations.get(index).cloned().unwrap_or_default(),
                        snatch: cell.snatch,
                        clean: cell.clean_jerk,
                        total: cell.total,
                        snatch_attempt: cell.snatch_highlight.is_some(),
                        clean_attempt: cell.clean_jerk_highlight.is_some(),
                        total_attempt: cell.total_highlight.is_some(),
                    })
                    .collect(),
            })
            .collect();

        Records {
            federations,
            categories: raw.record_categories,
            records,
        }
    }
}
