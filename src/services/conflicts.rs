//! Conflict detection between a candidate appointment and an existing agenda.
//!
//! A candidate is checked against each existing appointment independently:
//! - overlapping intervals produce a blocking `TIME_OVERLAP`
//! - otherwise, when both sides are located, a gap shorter than the travel
//!   time plus the candidate's buffer produces a non-blocking `TRAVEL_TOO_TIGHT`
//!
//! An invalid candidate range short-circuits with a single `INVALID_TIME`.

use tracing::debug;

use crate::services::geo::TravelEstimator;
use crate::types::{Appointment, Conflict};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    estimator: TravelEstimator,
}

impl ConflictDetector {
    pub fn new(estimator: TravelEstimator) -> Self {
        Self { estimator }
    }

    pub fn detect(&self, candidate: &Appointment, existing: &[Appointment]) -> Vec<Conflict> {
        let candidate_range = match candidate.time_range() {
            Ok(range) => range,
            Err(reason) => return vec![Conflict::invalid_time(reason)],
        };

        let candidate_coords = candidate.coordinates();
        let buffer_minutes = candidate.effective_buffer_minutes();
        let mut conflicts = Vec::new();

        for other in existing {
            let other_range = match other.time_range() {
                Ok(range) => range,
                Err(reason) => {
                    debug!("Skipping existing appointment {}: {}", other.label(), reason);
                    continue;
                }
            };

            if candidate_range.overlaps(&other_range) {
                conflicts.push(Conflict::time_overlap(other));
                // Travel check is moot for this pair only.
                continue;
            }

            let other_coords = other.coordinates();
            let Some(travel) = self
                .estimator
                .travel_minutes(candidate_coords.as_ref(), other_coords.as_ref())
            else {
                continue;
            };

            let gap = candidate_range.gap_minutes(&other_range);
            let required = travel + i64::from(buffer_minutes);
            if gap < required as f64 {
                conflicts.push(Conflict::travel_too_tight(other, travel, buffer_minutes, gap));
            }
        }

        debug!(
            "Detected {} conflict(s) for {} against {} existing appointment(s)",
            conflicts.len(),
            candidate.label(),
            existing.len()
        );

        conflicts
    }
}

/// Detect conflicts at the default average speed.
pub fn detect_conflicts(candidate: &Appointment, existing: &[Appointment]) -> Vec<Conflict> {
    ConflictDetector::default().detect(candidate, existing)
}
