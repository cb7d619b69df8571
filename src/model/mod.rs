//! Records as the stored procedures hand them out.
//!
//! None of these are validated here; the procedures own every rule about
//! them. The types only exist so that callers can read rows without poking
//! at raw JSON, and they are deliberately lenient: missing or `null` fields
//! decode to their defaults.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

mod award;

pub use award::{Award, AwardDetails, MedalCount, Placements, RankingRow};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    #[serde(rename = "SPORTS", alias = "sports", alias = "Sports")]
    Sports,
    /// Literary and musical events.
    #[serde(rename = "LITMUS", alias = "litmus", alias = "Litmus")]
    Litmus,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Sports => "SPORTS",
            EventType::Litmus => "LITMUS",
        }
    }
}

/// `date_added` as sent by the pages: usually an ISO-8601 instant, but
/// whatever else the database stored is kept verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Timestamp {
    Parsed(DateTime<Utc>),
    /// DATETIME columns carry no offset.
    Local(NaiveDateTime),
    Raw(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Account {
    #[serde(deserialize_with = "nullable")]
    pub user_code: String,
    #[serde(deserialize_with = "nullable")]
    pub user_fullname: String,
    #[serde(deserialize_with = "nullable")]
    pub user_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_password: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub user_campus: String,
    #[serde(deserialize_with = "nullable")]
    pub filename: String,
    #[serde(deserialize_with = "nullable")]
    pub added_by: String,
    pub date_added: Option<Timestamp>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Campus {
    #[serde(deserialize_with = "nullable")]
    pub campus_code: String,
    #[serde(deserialize_with = "nullable")]
    pub campus_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub added_by: String,
    pub date_added: Option<Timestamp>,
}

impl Campus {
    /// The owning file; the pages use both field names.
    pub fn file(&self) -> Option<&str> {
        first_present(&self.campus_file, &self.filename)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "nullable")]
    pub event_code: String,
    #[serde(deserialize_with = "nullable")]
    pub event_name: String,
    pub event_type: Option<EventType>,
    #[serde(deserialize_with = "nullable")]
    pub event_manager: String,
    #[serde(deserialize_with = "nullable")]
    pub event_venue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub added_by: String,
    pub date_added: Option<Timestamp>,
}

impl Event {
    pub fn file(&self) -> Option<&str> {
        first_present(&self.event_file, &self.filename)
    }
}

/// A tabulation file, i.e. one year's dataset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct File {
    #[serde(deserialize_with = "nullable")]
    pub file_name: String,
    #[serde(deserialize_with = "nullable")]
    pub added_by: String,
    pub date_added: Option<Timestamp>,
}

/// Returned by `Verify_Otp` once a login completes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct UserDetails {
    #[serde(deserialize_with = "nullable")]
    pub user_code: String,
    #[serde(deserialize_with = "nullable")]
    pub user_email: String,
    #[serde(deserialize_with = "nullable")]
    pub user_campus: String,
    #[serde(deserialize_with = "nullable")]
    pub user_fullname: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CodePrefix {
    Account,
    Campus,
    Event,
}

impl CodePrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            CodePrefix::Account => "AC",
            CodePrefix::Campus => "CC",
            CodePrefix::Event => "EC",
        }
    }
}

const CODE_LEN: usize = 6;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A fresh record code: the two-letter prefix followed by six random
/// uppercase alphanumerics.
pub fn generate_code(prefix: CodePrefix) -> String {
    generate_code_with(prefix, &mut rand::rng())
}

pub fn generate_code_with<R: Rng + ?Sized>(
    prefix: CodePrefix,
    rng: &mut R,
) -> String {
    let mut code = String::with_capacity(2 + CODE_LEN);
    code.push_str(prefix.as_str());
    code.extend((0..CODE_LEN).map(|_| {
        CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char
    }));
    code
}

fn first_present<'a>(
    a: &'a Option<String>,
    b: &'a Option<String>,
) -> Option<&'a str> {
    a.as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| b.as_deref().filter(|s| !s.is_empty()))
}

/// Treats `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
