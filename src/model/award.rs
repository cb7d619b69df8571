use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{EventType, Timestamp, nullable};

/// Counts decode leniently: floats are truncated, negatives and `null`
/// read as zero, and missing keys default, as long as at least one medal
/// key is present.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "RawCounts")]
pub struct MedalCount {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
}

/// Litmus events place five campuses rather than three. At least one of
/// `fourth` and `fifth` must be present.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Default)]
#[serde(try_from = "RawCounts")]
pub struct Placements {
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub fourth: u32,
    pub fifth: u32,
}

#[derive(Deserialize)]
struct RawCounts {
    #[serde(default, deserialize_with = "count")]
    gold: Option<u32>,
    #[serde(default, deserialize_with = "count")]
    silver: Option<u32>,
    #[serde(default, deserialize_with = "count")]
    bronze: Option<u32>,
    #[serde(default, deserialize_with = "count")]
    fourth: Option<u32>,
    #[serde(default, deserialize_with = "count")]
    fifth: Option<u32>,
}

impl TryFrom<RawCounts> for MedalCount {
    type Error = &'static str;

    fn try_from(raw: RawCounts) -> Result<Self, Self::Error> {
        if raw.gold.is_none() && raw.silver.is_none() && raw.bronze.is_none()
        {
            return Err("no medal counts");
        }
        Ok(MedalCount {
            gold: raw.gold.unwrap_or_default(),
            silver: raw.silver.unwrap_or_default(),
            bronze: raw.bronze.unwrap_or_default(),
        })
    }
}

impl TryFrom<RawCounts> for Placements {
    type Error = &'static str;

    fn try_from(raw: RawCounts) -> Result<Self, Self::Error> {
        if raw.fourth.is_none() && raw.fifth.is_none() {
            return Err("no fourth or fifth placements");
        }
        Ok(Placements {
            gold: raw.gold.unwrap_or_default(),
            silver: raw.silver.unwrap_or_default(),
            bronze: raw.bronze.unwrap_or_default(),
            fourth: raw.fourth.unwrap_or_default(),
            fifth: raw.fifth.unwrap_or_default(),
        })
    }
}

/// The `details` object of an award or ranking row. Its shape depends on
/// the event type and on which procedure produced it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AwardDetails {
    // must stay ahead of `Sports`, which would also match
    Litmus(Placements),
    Sports(MedalCount),
    /// A single placing, `"1"` for first through `"5"` for fifth.
    Placement {
        #[serde(deserialize_with = "string_or_number")]
        award: String,
    },
    Score {
        score: f64,
    },
    Other(Value),
}

impl Default for AwardDetails {
    fn default() -> Self {
        AwardDetails::Other(Value::Null)
    }
}

impl AwardDetails {
    /// Gold, silver and bronze counts, where the details carry them.
    pub fn medals(&self) -> Option<MedalCount> {
        match self {
            AwardDetails::Sports(medals) => Some(*medals),
            AwardDetails::Litmus(p) => Some(MedalCount {
                gold: p.gold,
                silver: p.silver,
                bronze: p.bronze,
            }),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            AwardDetails::Score { score } => Some(*score),
            _ => None,
        }
    }

    pub fn placement(&self) -> Option<&str> {
        match self {
            AwardDetails::Placement { award } => Some(award),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Award {
    #[serde(deserialize_with = "nullable")]
    pub award_code: String,
    #[serde(deserialize_with = "nullable")]
    pub campus_code: String,
    #[serde(deserialize_with = "nullable")]
    pub campus_name: String,
    #[serde(deserialize_with = "nullable")]
    pub event_code: String,
    #[serde(deserialize_with = "nullable")]
    pub event_name: String,
    pub event_type: Option<EventType>,
    pub details: AwardDetails,
    #[serde(deserialize_with = "nullable")]
    pub filename: String,
    #[serde(deserialize_with = "nullable")]
    pub added_by: String,
    pub date_added: Option<Timestamp>,
}

impl Award {
    /// Award codes identify one campus's result in one event.
    pub fn code_for(campus_code: &str, event_code: &str) -> String {
        format!("{campus_code}{event_code}")
    }

    /// Fills in `award_code` from the campus and event codes.
    pub fn with_derived_code(mut self) -> Self {
        self.award_code = Self::code_for(&self.campus_code, &self.event_code);
        self
    }
}

/// One campus's line in a ranking summary.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct RankingRow {
    #[serde(deserialize_with = "nullable")]
    pub campus_code: String,
    #[serde(deserialize_with = "nullable")]
    pub campus_name: String,
    pub event_type: Option<EventType>,
    pub details: AwardDetails,
}

fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    // `as` saturates: negatives and NaN become 0
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(0)),
        Value::Number(n) => Ok(Some(n.as_f64().map_or(0, |f| f as u32))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| Some(f as u32))
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a count, found {other}"
        ))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}
