//! Request validation at the service boundary.
//!
//! Raw inputs are deserialized leniently, then checked once and turned into
//! the typed values the scheduling core works with. Scalar fields arrive as
//! plain JSON values so a wrong type is reported against its path like any
//! other failure. Every failing field is reported, not just the first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::defaults::{DEFAULT_BUFFER_MINUTES, MAX_BUFFER_MINUTES, MAX_OPPORTUNITY_SCORE};
use crate::types::{Appointment, PlanRequest, StartLocation};

/// Shortest accepted plan date (`YYYY-MM-DD`)
const MIN_DATE_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid request: {}", summarize(.issues))]
pub struct ValidationErrors {
    pub issues: Vec<ValidationIssue>,
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.path, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(path, message);
        errors
    }

    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// A raw scalar after its JSON type has been checked
enum Field<T> {
    Missing,
    Valid(T),
    Invalid,
}

impl<T> Field<T> {
    fn valid(self) -> Option<T> {
        match self {
            Field::Valid(value) => Some(value),
            Field::Missing | Field::Invalid => None,
        }
    }
}

/// Read a raw value with `read`, recording `message` when it has the wrong type.
/// `null` counts as missing.
fn read_field<T>(
    errors: &mut ValidationErrors,
    path: &str,
    value: Option<Value>,
    message: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Field<T> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(raw) => match read(&raw) {
            Some(value) => Field::Valid(value),
            None => {
                errors.push(path, message);
                Field::Invalid
            }
        },
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Integers, including floats with no fractional part (`15.0`)
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
            .map(|f| f as i64)
    })
}

fn optional_text(errors: &mut ValidationErrors, path: String, label: &str, value: Option<Value>) -> Option<String> {
    read_field(errors, &path, value, &format!("{} must be a string", label), as_text).valid()
}

/// Non-blank string; a wrong type is reported once, not also as missing.
fn required_text(errors: &mut ValidationErrors, path: String, label: &str, value: Option<Value>) -> String {
    match read_field(errors, &path, value, &format!("{} must be a string", label), as_text) {
        Field::Valid(text) if !text.trim().is_empty() => text,
        Field::Invalid => String::new(),
        Field::Valid(_) | Field::Missing => {
            errors.push(path, format!("{} is required", label));
            String::new()
        }
    }
}

fn latitude_field(errors: &mut ValidationErrors, path: String, value: Option<Value>) -> Field<f64> {
    let lat = read_field(errors, &path, value, "Latitude must be a number", as_number);
    if let Field::Valid(value) = lat {
        if !(-90.0..=90.0).contains(&value) {
            errors.push(path, "Latitude must be between -90 and 90");
        }
    }
    lat
}

fn longitude_field(errors: &mut ValidationErrors, path: String, value: Option<Value>) -> Field<f64> {
    let lng = read_field(errors, &path, value, "Longitude must be a number", as_number);
    if let Field::Valid(value) = lng {
        if !(-180.0..=180.0).contains(&value) {
            errors.push(path, "Longitude must be between -180 and 180");
        }
    }
    lng
}

fn check_score(errors: &mut ValidationErrors, path: String, score: Option<i64>) {
    if let Some(score) = score {
        if !(0..=i64::from(MAX_OPPORTUNITY_SCORE)).contains(&score) {
            errors.push(path, format!("Opportunity score must be between 0 and {}", MAX_OPPORTUNITY_SCORE));
        }
    }
}

/// Appointment as submitted for validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub client_id: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub start: Option<Value>,
    #[serde(default)]
    pub end: Option<Value>,
    #[serde(default)]
    pub buffer_minutes: Option<Value>,
    #[serde(default)]
    pub opportunity_score: Option<Value>,
}

impl AppointmentInput {
    pub fn validate(self) -> Result<Appointment, ValidationErrors> {
        self.validate_at("")
    }

    /// Validate with issue paths nested under `prefix`.
    ///
    /// Time ranges are only checked for presence here; ordering is a domain
    /// outcome reported by the conflict detector.
    pub fn validate_at(self, prefix: &str) -> Result<Appointment, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = required_text(&mut errors, field(prefix, "title"), "Title", self.title);
        let start = required_text(&mut errors, field(prefix, "start"), "Start", self.start);
        let end = required_text(&mut errors, field(prefix, "end"), "End", self.end);

        let buffer_path = field(prefix, "bufferMinutes");
        let buffer_minutes =
            match read_field(&mut errors, &buffer_path, self.buffer_minutes, "Buffer must be an integer", as_integer) {
                Field::Valid(buffer) => {
                    if !(0..=i64::from(MAX_BUFFER_MINUTES)).contains(&buffer) {
                        errors.push(
                            buffer_path,
                            format!("Buffer must be between 0 and {} minutes", MAX_BUFFER_MINUTES),
                        );
                    }
                    buffer
                }
                Field::Missing | Field::Invalid => i64::from(DEFAULT_BUFFER_MINUTES),
            };

        let score_path = field(prefix, "opportunityScore");
        let opportunity_score = read_field(
            &mut errors,
            &score_path,
            self.opportunity_score,
            "Opportunity score must be an integer",
            as_integer,
        )
        .valid();
        check_score(&mut errors, score_path, opportunity_score);

        let latitude = latitude_field(&mut errors, field(prefix, "latitude"), self.latitude).valid();
        let longitude = longitude_field(&mut errors, field(prefix, "longitude"), self.longitude).valid();

        let id = optional_text(&mut errors, field(prefix, "id"), "Id", self.id);
        let client_id = optional_text(&mut errors, field(prefix, "clientId"), "Client id", self.client_id);
        let address = optional_text(&mut errors, field(prefix, "address"), "Address", self.address);

        // Ranges checked above; the casts cannot truncate.
        errors.finish(Appointment {
            id,
            title,
            client_id,
            address,
            latitude,
            longitude,
            start,
            end,
            buffer_minutes: buffer_minutes as i32,
            opportunity_score: opportunity_score.map(|score| score as i32),
        })
    }
}

/// Body of an appointment validation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAppointmentRequest {
    #[serde(default)]
    pub appointment: Option<AppointmentInput>,
    #[serde(default)]
    pub existing_appointments: Vec<Appointment>,
}

/// Candidate and agenda ready for conflict detection
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAppointmentRequest {
    pub candidate: Appointment,
    pub existing: Vec<Appointment>,
}

impl ValidateAppointmentRequest {
    pub fn validate(self) -> Result<ValidatedAppointmentRequest, ValidationErrors> {
        let Some(appointment) = self.appointment else {
            return Err(ValidationErrors::single("appointment", "Appointment is required"));
        };
        let candidate = appointment.validate_at("appointment")?;
        Ok(ValidatedAppointmentRequest {
            candidate,
            existing: self.existing_appointments,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLocationInput {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub label: Option<Value>,
}

/// Body of a day-planning request
///
/// The appointment pool is already typed; a malformed pool entry is rejected
/// as an unreadable request rather than per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequestInput {
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub appointments: Option<Vec<Appointment>>,
    #[serde(default)]
    pub start_location: Option<StartLocationInput>,
}

impl PlanRequestInput {
    pub fn validate(self) -> Result<PlanRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let date = match read_field(&mut errors, "date", self.date, "Date must be a string", as_text) {
            Field::Invalid => String::new(),
            Field::Valid(date) if date.trim().chars().count() >= MIN_DATE_LEN => date.trim().to_string(),
            Field::Valid(_) | Field::Missing => {
                errors.push("date", "Date is required (YYYY-MM-DD)");
                String::new()
            }
        };

        let appointments = self.appointments.unwrap_or_default();
        if appointments.is_empty() {
            errors.push("appointments", "At least one appointment is required");
        }
        for (idx, apt) in appointments.iter().enumerate() {
            check_score(
                &mut errors,
                format!("appointments[{}].opportunityScore", idx),
                apt.opportunity_score.map(i64::from),
            );
        }

        let start_location = match self.start_location {
            None => None,
            Some(loc) => {
                let latitude = latitude_field(&mut errors, "startLocation.latitude".into(), loc.latitude);
                if let Field::Missing = latitude {
                    errors.push("startLocation.latitude", "Latitude is required");
                }
                let longitude = longitude_field(&mut errors, "startLocation.longitude".into(), loc.longitude);
                if let Field::Missing = longitude {
                    errors.push("startLocation.longitude", "Longitude is required");
                }
                let label = optional_text(&mut errors, "startLocation.label".into(), "Label", loc.label);
                match (latitude.valid(), longitude.valid()) {
                    (Some(latitude), Some(longitude)) => Some(StartLocation {
                        latitude,
                        longitude,
                        label,
                    }),
                    _ => None,
                }
            }
        };

        errors.finish(PlanRequest {
            date,
            appointments,
            start_location,
        })
    }
}
