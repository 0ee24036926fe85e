use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;
use crate::session::SessionId;

/// Lifecycle label attached to a submitted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Completed,
}

/// Snapshot of a finished survey handed to the submission sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub session_id: SessionId,
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub answers: AnswerMap,
    pub status: ResponseStatus,
}

impl SubmittedResponse {
    pub fn completed(session_id: SessionId, answers: AnswerMap) -> Self {
        Self {
            session_id,
            timestamp: Utc::now(),
            answers,
            status: ResponseStatus::Completed,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(self)
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
