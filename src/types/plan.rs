//! Day plan types

use serde::{Deserialize, Serialize};

use crate::types::{Appointment, Coordinates};

/// Where the day starts (office, home, first meeting point)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl StartLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

/// Planning options for a single day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanOptions {
    pub date: Option<String>,
    pub start_location: Option<Coordinates>,
}

/// Validated planning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub date: String,
    pub appointments: Vec<Appointment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_location: Option<StartLocation>,
}

impl PlanRequest {
    pub fn options(&self) -> PlanOptions {
        PlanOptions {
            date: Some(self.date.clone()),
            start_location: self.start_location.as_ref().map(StartLocation::coordinates),
        }
    }
}

/// One stop of the proposed day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub start: String,
    pub end: String,
    pub opportunity_score: i32,
    /// `None` together with `estimated_travel_minutes` when either end lacks coordinates
    pub distance_from_previous_km: Option<f64>,
    pub estimated_travel_minutes: Option<i64>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanErrorCode {
    MissingDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanError {
    pub code: PlanErrorCode,
    pub message: String,
}

/// Proposed visiting order for a day. Never executed without sign-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub success: bool,
    pub plan: Vec<PlanItem>,
    pub warnings: Vec<String>,
    pub requires_user_validation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PlanError>,
}

impl PlanResult {
    pub fn proposal(plan: Vec<PlanItem>, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            plan,
            warnings,
            requires_user_validation: true,
            error: None,
        }
    }

    pub fn missing_date() -> Self {
        Self {
            success: false,
            plan: vec![],
            warnings: vec![],
            requires_user_validation: true,
            error: Some(PlanError {
                code: PlanErrorCode::MissingDate,
                message: "A date is required to plan a day".to_string(),
            }),
        }
    }
}
