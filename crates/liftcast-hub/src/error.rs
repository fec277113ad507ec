use thiserror::Error;

/// Why an inbound controller event was not applied.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed JSON in {field}: {source}")]
    MalformedJson {
        field: &'static str,
        source: serde_json::Error,
    },
}
