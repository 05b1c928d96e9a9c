//! Business logic services

pub mod conflicts;
pub mod day_planner;
pub mod geo;

use crate::services::conflicts::ConflictDetector;
use crate::services::day_planner::DayPlanner;
use crate::services::geo::TravelEstimator;
use crate::types::{ConflictReport, PlanResult};
use crate::validation::{PlanRequestInput, ValidateAppointmentRequest, ValidationErrors};

/// Validate-then-compute entry points shared by the HTTP, NATS and CLI surfaces
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulingService {
    detector: ConflictDetector,
    planner: DayPlanner,
}

impl SchedulingService {
    pub fn new(estimator: TravelEstimator) -> Self {
        Self {
            detector: ConflictDetector::new(estimator),
            planner: DayPlanner::new(estimator),
        }
    }

    pub fn check_appointment(
        &self,
        request: ValidateAppointmentRequest,
    ) -> Result<ConflictReport, ValidationErrors> {
        let validated = request.validate()?;
        let conflicts = self.detector.detect(&validated.candidate, &validated.existing);
        Ok(ConflictReport::from(conflicts))
    }

    pub fn plan_day(&self, request: PlanRequestInput) -> Result<PlanResult, ValidationErrors> {
        let request = request.validate()?;
        Ok(self.planner.plan(&request.appointments, &request.options()))
    }
}
