//! Greedy day planner.
//!
//! Orders one day's appointments by opportunity score, then by proximity to
//! the current position, then by start time. The result is a proposal that
//! always requires user validation.

use std::cmp::Ordering;

use tracing::debug;

use crate::defaults::MAX_OPPORTUNITY_SCORE;
use crate::services::geo::{haversine_distance, TravelEstimator};
use crate::types::{Appointment, Coordinates, PlanItem, PlanOptions, PlanResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct DayPlanner {
    estimator: TravelEstimator,
}

impl DayPlanner {
    pub fn new(estimator: TravelEstimator) -> Self {
        Self { estimator }
    }

    pub fn plan(&self, appointments: &[Appointment], options: &PlanOptions) -> PlanResult {
        let Some(date) = options
            .date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
        else {
            return PlanResult::missing_date();
        };
        let day = calendar_day(date);

        let mut remaining: Vec<&Appointment> = appointments
            .iter()
            .filter(|apt| calendar_day(&apt.start) == day)
            .collect();

        if remaining.is_empty() {
            debug!("No appointments to plan on {}", day);
            return PlanResult::proposal(
                vec![],
                vec![format!("No appointments scheduled on {}", day)],
            );
        }

        let mut current = options.start_location;
        let mut plan = Vec::with_capacity(remaining.len());
        let mut warnings = Vec::new();

        while !remaining.is_empty() {
            let next = pick_next(&remaining, current.as_ref());
            let appointment = remaining.remove(next);
            let coords = appointment.coordinates();

            let distance = self.estimator.distance_km(current.as_ref(), coords.as_ref());
            let travel = self.estimator.travel_minutes(current.as_ref(), coords.as_ref());

            if coords.is_none() {
                warnings.push(format!(
                    "{} has no coordinates and was ordered by priority only",
                    appointment.label()
                ));
            }

            plan.push(PlanItem {
                id: appointment.id.clone(),
                title: appointment.title.clone(),
                client_id: appointment.client_id.clone(),
                address: appointment.address.clone(),
                start: appointment.start.clone(),
                end: appointment.end.clone(),
                opportunity_score: appointment.score(),
                distance_from_previous_km: distance.map(round_km),
                estimated_travel_minutes: travel,
                reason: reason(appointment.score(), coords.is_some(), current.is_some(), distance, travel),
            });

            // A stop without coordinates keeps the previous position.
            if coords.is_some() {
                current = coords;
            }
        }

        debug!(
            "Planned {} appointment(s) on {} with {} warning(s)",
            plan.len(),
            day,
            warnings.len()
        );

        PlanResult::proposal(plan, warnings)
    }
}

/// Plan a day at the default average speed.
pub fn plan_day(appointments: &[Appointment], options: &PlanOptions) -> PlanResult {
    DayPlanner::default().plan(appointments, options)
}

/// `YYYY-MM-DD` prefix of a date or timestamp string.
fn calendar_day(value: &str) -> &str {
    let value = value.trim();
    value.get(..10).unwrap_or(value)
}

/// Index of the best-ranked appointment; ties keep pool order.
fn pick_next(pool: &[&Appointment], current: Option<&Coordinates>) -> usize {
    pool.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| rank(a, b, current))
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn rank(a: &Appointment, b: &Appointment, current: Option<&Coordinates>) -> Ordering {
    b.score()
        .cmp(&a.score())
        .then_with(|| sort_distance(current, a).total_cmp(&sort_distance(current, b)))
        .then_with(|| a.start.cmp(&b.start))
}

/// Sorting key only: unknown positions rank last.
fn sort_distance(current: Option<&Coordinates>, apt: &Appointment) -> f64 {
    match (current, apt.coordinates()) {
        (Some(from), Some(to)) => haversine_distance(from, &to),
        _ => f64::INFINITY,
    }
}

fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}

fn reason(
    score: i32,
    located: bool,
    has_previous: bool,
    distance: Option<f64>,
    travel: Option<i64>,
) -> String {
    let priority = format!("Opportunity score {}/{}", score, MAX_OPPORTUNITY_SCORE);
    match (distance, travel) {
        (Some(km), Some(minutes)) => {
            format!("{}, {:.1} km from previous stop (~{} min)", priority, km, minutes)
        }
        _ if !located => format!("{}, no coordinates: ordered by priority only", priority),
        _ if !has_previous => format!("{}, no known previous position", priority),
        _ => priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_appointment(id: &str, start: &str, score: Option<i32>, coords: Option<(f64, f64)>) -> Appointment {
        Appointment {
            id: Some(id.to_string()),
            title: format!("Visit {}", id),
            client_id: Some(format!("client-{}", id)),
            address: None,
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            start: start.to_string(),
            end: start.replace("T09", "T10"),
            buffer_minutes: 10,
            opportunity_score: score,
        }
    }

    fn options(date: &str, start: Option<(f64, f64)>) -> PlanOptions {
        PlanOptions {
            date: Some(date.to_string()),
            start_location: start.map(|(lat, lng)| Coordinates { lat, lng }),
        }
    }

    fn ids(result: &PlanResult) -> Vec<&str> {
        result.plan.iter().map(|item| item.id.as_deref().unwrap_or("")).collect()
    }

    /// Point roughly `km` kilometers north of `origin`.
    fn north_of(origin: (f64, f64), km: f64) -> (f64, f64) {
        (origin.0 + km / 111.195, origin.1)
    }

    #[test]
    fn test_missing_date_is_rejected() {
        let result = plan_day(&[], &PlanOptions::default());
        assert!(!result.success);
        assert!(result.requires_user_validation);
        assert_eq!(
            result.error.map(|e| e.code),
            Some(crate::types::PlanErrorCode::MissingDate)
        );

        let blank = plan_day(&[], &options("   ", None));
        assert!(!blank.success);
    }

    #[test]
    fn test_empty_day_is_a_successful_empty_proposal() {
        let result = plan_day(&[], &options("2025-01-15", None));
        assert!(result.success);
        assert!(result.plan.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("2025-01-15"));
        assert!(result.requires_user_validation);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_only_appointments_of_the_requested_day_are_planned() {
        let appointments = vec![
            make_appointment("today", "2025-01-15T09:00", Some(1), None),
            make_appointment("tomorrow", "2025-01-16T09:00", Some(9), None),
        ];
        let result = plan_day(&appointments, &options("2025-01-15T00:00:00Z", None));
        assert_eq!(ids(&result), vec!["today"]);
    }

    #[test]
    fn test_no_coordinates_orders_by_score() {
        let appointments = vec![
            make_appointment("low", "2025-01-15T09:00", Some(3), None),
            make_appointment("high", "2025-01-15T09:30", Some(9), None),
            make_appointment("mid", "2025-01-15T09:15", Some(6), None),
        ];

        let result = plan_day(&appointments, &options("2025-01-15", None));

        assert_eq!(ids(&result), vec!["high", "mid", "low"]);
        assert!(result.plan.iter().all(|item| item.distance_from_previous_km.is_none()));
        assert!(result.plan.iter().all(|item| item.estimated_travel_minutes.is_none()));
        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings[0].contains("Visit high"));
        assert!(result.requires_user_validation);
    }

    #[test]
    fn test_proximity_breaks_score_ties() {
        let depot = (48.8566, 2.3522);
        let appointments = vec![
            make_appointment("far", "2025-01-15T09:00", Some(5), Some(north_of(depot, 5.0))),
            make_appointment("near", "2025-01-15T09:30", Some(5), Some(north_of(depot, 1.0))),
        ];

        let result = plan_day(&appointments, &options("2025-01-15", Some(depot)));

        assert_eq!(ids(&result), vec!["near", "far"]);
        let first = &result.plan[0];
        assert!((first.distance_from_previous_km.unwrap() - 1.0).abs() < 0.05);
        // 1 km at 35 km/h
        assert_eq!(first.estimated_travel_minutes, Some(2));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_score_beats_proximity() {
        let depot = (48.8566, 2.3522);
        let appointments = vec![
            make_appointment("near", "2025-01-15T09:00", Some(2), Some(north_of(depot, 0.5))),
            make_appointment("far", "2025-01-15T09:30", Some(8), Some(north_of(depot, 20.0))),
        ];

        let result = plan_day(&appointments, &options("2025-01-15", Some(depot)));
        assert_eq!(ids(&result), vec!["far", "near"]);
    }

    #[test]
    fn test_start_time_breaks_remaining_ties() {
        let appointments = vec![
            make_appointment("late", "2025-01-15T09:45", Some(4), None),
            make_appointment("early", "2025-01-15T09:05", Some(4), None),
        ];
        let result = plan_day(&appointments, &options("2025-01-15", None));
        assert_eq!(ids(&result), vec!["early", "late"]);
    }

    #[test]
    fn test_located_appointments_rank_before_unlocated_on_equal_score() {
        let depot = (48.8566, 2.3522);
        let appointments = vec![
            make_appointment("unknown", "2025-01-15T09:00", Some(5), None),
            make_appointment("known", "2025-01-15T09:30", Some(5), Some(north_of(depot, 30.0))),
        ];
        let result = plan_day(&appointments, &options("2025-01-15", Some(depot)));
        assert_eq!(ids(&result), vec!["known", "unknown"]);
    }

    #[test]
    fn test_current_location_sticks_across_unlocated_stop() {
        let depot = (48.8566, 2.3522);
        let first = north_of(depot, 10.0);
        let appointments = vec![
            make_appointment("first", "2025-01-15T09:00", Some(9), Some(first)),
            make_appointment("blind", "2025-01-15T09:10", Some(7), None),
            // Same score: proximity is measured from "first", not from nowhere
            make_appointment("near-first", "2025-01-15T09:50", Some(5), Some(north_of(first, 1.0))),
            make_appointment("near-depot", "2025-01-15T09:20", Some(5), Some(north_of(depot, 1.0))),
        ];

        let result = plan_day(&appointments, &options("2025-01-15", Some(depot)));

        assert_eq!(ids(&result), vec!["first", "blind", "near-first", "near-depot"]);
        let near_first = &result.plan[2];
        assert!((near_first.distance_from_previous_km.unwrap() - 1.0).abs() < 0.05);
        assert!(result.plan[1].distance_from_previous_km.is_none());
    }

    #[test]
    fn test_without_start_location_first_stop_has_no_distance() {
        let appointments = vec![
            make_appointment("a", "2025-01-15T09:00", Some(5), Some((48.85, 2.35))),
            make_appointment("b", "2025-01-15T09:30", Some(4), Some((48.86, 2.35))),
        ];
        let result = plan_day(&appointments, &options("2025-01-15", None));

        assert!(result.plan[0].distance_from_previous_km.is_none());
        assert!(result.plan[0].estimated_travel_minutes.is_none());
        assert!(result.plan[0].reason.contains("no known previous position"));
        assert!(result.plan[1].distance_from_previous_km.is_some());
        assert!(result.plan[1].estimated_travel_minutes.is_some());
    }

    #[test]
    fn test_plan_items_carry_appointment_details() {
        let appointments = vec![make_appointment("a", "2025-01-15T09:00", None, None)];
        let result = plan_day(&appointments, &options("2025-01-15", None));

        let item = &result.plan[0];
        assert_eq!(item.title, "Visit a");
        assert_eq!(item.client_id.as_deref(), Some("client-a"));
        assert_eq!(item.opportunity_score, 0);
        assert_eq!(item.end, "2025-01-15T10:00");
        assert!(item.reason.starts_with("Opportunity score 0/10"));
    }

    #[test]
    fn test_plan_result_serializes_camel_case() {
        let result = plan_day(&[], &options("2025-01-15", None));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["requiresUserValidation"], true);
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
    }
}
