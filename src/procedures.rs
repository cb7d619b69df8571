//! The stored procedures the tabulation pages call, and the payloads they
//! expect.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::EventType;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Procedure {
    AddAward,
    AddFile,
    LoginUser,
    RankingSummary,
    SelectAwardByCampus,
    SelectAwardByCode,
    SelectCampusAll,
    SelectEventAll,
    SelectEventByType,
    SelectFiles,
    SelectLogs,
    SelectUserAll,
    UpdateCampus,
    UpdateEvent,
    UpdateUser,
    VerifyOtp,
}

impl Procedure {
    pub const ALL: [Procedure; 16] = [
        Procedure::AddAward,
        Procedure::AddFile,
        Procedure::LoginUser,
        Procedure::RankingSummary,
        Procedure::SelectAwardByCampus,
        Procedure::SelectAwardByCode,
        Procedure::SelectCampusAll,
        Procedure::SelectEventAll,
        Procedure::SelectEventByType,
        Procedure::SelectFiles,
        Procedure::SelectLogs,
        Procedure::SelectUserAll,
        Procedure::UpdateCampus,
        Procedure::UpdateEvent,
        Procedure::UpdateUser,
        Procedure::VerifyOtp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Procedure::AddAward => "Add_Award",
            Procedure::AddFile => "Add_File",
            Procedure::LoginUser => "Login_User",
            Procedure::RankingSummary => "Ranking_Summary",
            Procedure::SelectAwardByCampus => "Select_Award_By_Campus",
            Procedure::SelectAwardByCode => "Select_Award_By_Code",
            Procedure::SelectCampusAll => "Select_Campus_All",
            Procedure::SelectEventAll => "Select_Event_All",
            Procedure::SelectEventByType => "Select_Event_By_Type",
            Procedure::SelectFiles => "Select_Files",
            Procedure::SelectLogs => "Select_Logs",
            Procedure::SelectUserAll => "Select_User_All",
            Procedure::UpdateCampus => "Update_Campus",
            Procedure::UpdateEvent => "Update_Event",
            Procedure::UpdateUser => "Update_User",
            Procedure::VerifyOtp => "Verify_Otp",
        }
    }

    /// The array field a listing procedure puts its rows in.
    pub fn list_field(self) -> Option<&'static str> {
        match self {
            Procedure::SelectCampusAll => Some("campus_list"),
            Procedure::SelectEventAll => Some("event_list"),
            Procedure::SelectEventByType | Procedure::SelectAwardByCode => {
                Some("event_details")
            }
            Procedure::SelectAwardByCampus => Some("award_details"),
            Procedure::SelectUserAll => Some("user_lists"),
            Procedure::SelectFiles => Some("file_lists"),
            Procedure::RankingSummary => Some("ranking_lists"),
            Procedure::SelectLogs => Some("log_details"),
            _ => None,
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unknown procedure `{0}`")]
pub struct UnknownProcedure(pub String);

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProcedure(s.to_string()))
    }
}

/// A `{data, spname}` request body, ready to be posted to `/api`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub data: Value,
    pub spname: String,
}

impl ProcedureCall {
    pub fn new<P: Serialize>(
        procedure: Procedure,
        payload: &P,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            data: serde_json::to_value(payload)?,
            spname: procedure.as_str().to_string(),
        })
    }
}

/// Scopes a listing to one tabulation file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileScope {
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventTypeScope {
    pub event_type: EventType,
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CampusAwardQuery {
    pub campus_code: String,
    pub event_type: EventType,
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventAwardQuery {
    pub event_code: String,
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credentials {
    pub user_email: String,
    pub user_password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OtpCheck {
    pub user_email: String,
    pub user_password: String,
    pub otp: String,
}

/// `Select_Files` takes no scope; the pages send this marker instead.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AllFiles {
    pub data: String,
}

impl Default for AllFiles {
    fn default() -> Self {
        Self {
            data: "ALL".to_string(),
        }
    }
}
