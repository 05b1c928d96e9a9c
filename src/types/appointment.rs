//! Appointment, coordinate and conflict types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults::{default_buffer_minutes, MAX_BUFFER_MINUTES, MAX_OPPORTUNITY_SCORE};

/// GPS coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Known position only when both components are present.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

/// A candidate or existing appointment, as supplied by the caller.
///
/// Timestamps stay string-encoded on the wire and are only parsed when a
/// time range is needed. The client reference is informational and never
/// resolved here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    /// Turnaround required after travel before the appointment may begin
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i32,
    /// Business priority, 0-10 (planner only)
    #[serde(default)]
    pub opportunity_score: Option<i32>,
}

impl Appointment {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }

    pub fn effective_buffer_minutes(&self) -> i32 {
        self.buffer_minutes.clamp(0, MAX_BUFFER_MINUTES)
    }

    /// Opportunity score with absence treated as 0.
    pub fn score(&self) -> i32 {
        self.opportunity_score
            .unwrap_or(0)
            .clamp(0, MAX_OPPORTUNITY_SCORE)
    }

    /// Parsed `[start, end)` interval; `end` must be strictly after `start`.
    pub fn time_range(&self) -> Result<TimeRange, TimeRangeError> {
        let start = parse_timestamp(&self.start).ok_or(TimeRangeError::Unparseable("start"))?;
        let end = parse_timestamp(&self.end).ok_or(TimeRangeError::Unparseable("end"))?;
        if end <= start {
            return Err(TimeRangeError::NotIncreasing);
        }
        Ok(TimeRange { start, end })
    }

    /// Human label used in conflict messages and plan warnings.
    pub fn label(&self) -> String {
        let title = self.title.trim();
        if !title.is_empty() {
            format!("\"{}\"", title)
        } else if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            format!("appointment {}", id)
        } else {
            "an existing appointment".to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimeRangeError {
    #[error("{0} is not a valid timestamp")]
    Unparseable(&'static str),
    #[error("end must be after start")]
    NotIncreasing,
}

/// Half-open time interval in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Minutes between the earlier range's end and the later range's start.
    /// Only meaningful for non-overlapping ranges.
    pub fn gap_minutes(&self, other: &TimeRange) -> f64 {
        let gap = if self.end <= other.start {
            other.start - self.end
        } else {
            self.start - other.end
        };
        gap.num_seconds() as f64 / 60.0
    }
}

/// Parse a string-encoded timestamp.
///
/// RFC 3339 values keep their offset and are normalized to UTC. Naive
/// date-times and bare dates carry no zone and are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictCode {
    InvalidTime,
    TimeOverlap,
    TravelTooTight,
}

impl ConflictCode {
    /// Blocking conflicts must prevent the appointment from being saved.
    pub fn is_blocking(self) -> bool {
        match self {
            ConflictCode::InvalidTime | ConflictCode::TimeOverlap => true,
            ConflictCode::TravelTooTight => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub code: ConflictCode,
    pub message: String,
    pub blocking: bool,
    /// Id of the existing appointment involved, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

impl Conflict {
    fn new(code: ConflictCode, message: String, appointment_id: Option<String>) -> Self {
        Self {
            code,
            blocking: code.is_blocking(),
            message,
            appointment_id,
        }
    }

    pub fn invalid_time(reason: TimeRangeError) -> Self {
        Self::new(
            ConflictCode::InvalidTime,
            format!("Invalid time range: {}", reason),
            None,
        )
    }

    pub fn time_overlap(existing: &Appointment) -> Self {
        Self::new(
            ConflictCode::TimeOverlap,
            format!("Overlaps with {} ({} - {})", existing.label(), existing.start, existing.end),
            existing.id.clone(),
        )
    }

    pub fn travel_too_tight(
        existing: &Appointment,
        travel_minutes: i64,
        buffer_minutes: i32,
        gap_minutes: f64,
    ) -> Self {
        Self::new(
            ConflictCode::TravelTooTight,
            format!(
                "Only {:.0} min between this appointment and {}, but travel takes about {} min plus {} min buffer",
                gap_minutes,
                existing.label(),
                travel_minutes,
                buffer_minutes
            ),
            existing.id.clone(),
        )
    }
}

/// Conflicts found for a candidate appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    /// Convenience flag: saving must be prevented
    pub has_blocking_conflict: bool,
}

impl From<Vec<Conflict>> for ConflictReport {
    fn from(conflicts: Vec<Conflict>) -> Self {
        let has_blocking_conflict = conflicts.iter().any(|c| c.blocking);
        Self {
            conflicts,
            has_blocking_conflict,
        }
    }
}
