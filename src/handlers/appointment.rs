//! Appointment validation handler

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{debug, error, warn};

use crate::handlers::process_request;
use crate::services::SchedulingService;
use crate::validation::ValidateAppointmentRequest;

/// Handle agenda.appointment.validate requests
pub async fn handle_validate(
    client: Client,
    mut subscriber: Subscriber,
    scheduler: SchedulingService,
) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received appointment.validate message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let response = match validate_payload(&scheduler, &msg.payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to encode validate response: {}", e);
                continue;
            }
        };

        if let Err(e) = client.publish(reply, response.into()).await {
            error!("Failed to publish validate response: {}", e);
        }
    }

    Ok(())
}

fn validate_payload(scheduler: &SchedulingService, payload: &[u8]) -> serde_json::Result<Vec<u8>> {
    process_request(payload, |request: ValidateAppointmentRequest| {
        scheduler.check_appointment(request)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Request;
    use serde_json::{json, Value};

    #[test]
    fn test_validate_payload_returns_conflict_report() {
        let request = Request::new(json!({
            "appointment": {"title": "Demo", "start": "2025-01-15T10:00", "end": "2025-01-15T09:00"},
            "existingAppointments": []
        }));
        let bytes = serde_json::to_vec(&request).unwrap();

        let response: Value =
            serde_json::from_slice(&validate_payload(&SchedulingService::default(), &bytes).unwrap()).unwrap();

        assert_eq!(response["id"], request.id.to_string());
        assert_eq!(response["payload"]["conflicts"][0]["code"], "INVALID_TIME");
        assert_eq!(response["payload"]["conflicts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_validate_payload_rejects_missing_title() {
        let request = Request::new(json!({
            "appointment": {"start": "2025-01-15T10:00", "end": "2025-01-15T11:00"}
        }));
        let bytes = serde_json::to_vec(&request).unwrap();

        let response: Value =
            serde_json::from_slice(&validate_payload(&SchedulingService::default(), &bytes).unwrap()).unwrap();

        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(response["error"]["details"][0]["path"], "appointment.title");
    }
}
