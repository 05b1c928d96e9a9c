//! Day planning handler

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};

use crate::handlers::process_request;
use crate::services::SchedulingService;
use crate::validation::PlanRequestInput;

/// Handle agenda.planning.day requests
pub async fn handle_plan_day(
    client: Client,
    mut subscriber: Subscriber,
    scheduler: SchedulingService,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received planning.day message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let response = match plan_payload(&scheduler, &msg.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode plan response: {}", e);
                continue;
            }
        };

        if let Err(e) = client.publish(reply, response.into()).await {
            error!("Failed to publish plan response: {}", e);
        }
    }

    Ok(())
}

fn plan_payload(scheduler: &SchedulingService, payload: &[u8]) -> serde_json::Result<Vec<u8>> {
    process_request(payload, |request: PlanRequestInput| scheduler.plan_day(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Request;
    use serde_json::{json, Value};

    #[test]
    fn test_plan_payload_orders_by_proximity_on_tie() {
        // near is ~1 km north of the start, far ~5 km
        let request = Request::new(json!({
            "date": "2025-01-15",
            "startLocation": {"latitude": 48.8566, "longitude": 2.3522, "label": "Office"},
            "appointments": [
                {"id": "far", "title": "Far", "start": "2025-01-15T09:00", "end": "2025-01-15T10:00",
                 "opportunityScore": 5, "latitude": 48.90157, "longitude": 2.3522},
                {"id": "near", "title": "Near", "start": "2025-01-15T10:00", "end": "2025-01-15T11:00",
                 "opportunityScore": 5, "latitude": 48.86559, "longitude": 2.3522}
            ]
        }));
        let bytes = serde_json::to_vec(&request).unwrap();

        let response: Value =
            serde_json::from_slice(&plan_payload(&SchedulingService::default(), &bytes).unwrap()).unwrap();

        assert_eq!(response["payload"]["plan"][0]["id"], "near");
        assert_eq!(response["payload"]["plan"][1]["id"], "far");
        assert_eq!(response["payload"]["requiresUserValidation"], true);
    }

    #[test]
    fn test_plan_payload_requires_date() {
        let request = Request::new(json!({
            "appointments": [{"title": "A", "start": "2025-01-15T09:00", "end": "2025-01-15T10:00"}]
        }));
        let bytes = serde_json::to_vec(&request).unwrap();

        let response: Value =
            serde_json::from_slice(&plan_payload(&SchedulingService::default(), &bytes).unwrap()).unwrap();

        assert_eq!(response["error"]["details"][0]["path"], "date");
    }
}
