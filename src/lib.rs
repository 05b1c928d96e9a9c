//! Agenda Worker - appointment scheduling core for the sales CRM
//!
//! Conflict detection between a candidate appointment and an agenda, and a
//! greedy day planner ordering visits by opportunity score and proximity.
//! Everything here is a pure, request-scoped computation; the HTTP and NATS
//! surfaces only validate input and serialize results.

pub mod api;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod handlers;
pub mod services;
pub mod types;
pub mod validation;

pub use services::conflicts::{detect_conflicts, ConflictDetector};
pub use services::day_planner::{plan_day, DayPlanner};
pub use services::geo::{distance_km, travel_minutes, TravelEstimator};
pub use services::SchedulingService;
