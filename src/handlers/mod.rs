//! NATS message handlers

pub mod appointment;
pub mod ping;
pub mod planning;

use anyhow::Result;
use async_nats::Client;
use serde::{de::DeserializeOwned, Serialize};
use tokio::select;
use tracing::{error, info};
use uuid::Uuid;

use crate::services::SchedulingService;
use crate::types::{ErrorResponse, Request, SuccessResponse};
use crate::validation::ValidationErrors;

pub const SUBJECT_PING: &str = "agenda.ping";
pub const SUBJECT_APPOINTMENT_VALIDATE: &str = "agenda.appointment.validate";
pub const SUBJECT_PLANNING_DAY: &str = "agenda.planning.day";

/// Decode a request envelope, run `operation` on its payload and encode the reply.
pub(crate) fn process_request<Req, Res, F>(payload: &[u8], operation: F) -> serde_json::Result<Vec<u8>>
where
    Req: DeserializeOwned,
    Res: Serialize,
    F: FnOnce(Req) -> Result<Res, ValidationErrors>,
{
    let request: Request<Req> = match serde_json::from_slice(payload) {
        Ok(req) => req,
        Err(e) => {
            error!("Failed to parse request: {}", e);
            let response = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
            return serde_json::to_vec(&response);
        }
    };

    match operation(request.payload) {
        Ok(result) => serde_json::to_vec(&SuccessResponse::new(request.id, result)),
        Err(errors) => {
            let response = ErrorResponse::new(request.id, "VALIDATION_ERROR", errors.to_string())
                .with_details(serde_json::to_value(&errors.issues)?);
            serde_json::to_vec(&response)
        }
    }
}

/// Start all message handlers
pub async fn start_handlers(client: Client, scheduler: SchedulingService) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe(SUBJECT_PING).await?;
    let validate_sub = client.subscribe(SUBJECT_APPOINTMENT_VALIDATE).await?;
    let plan_sub = client.subscribe(SUBJECT_PLANNING_DAY).await?;

    info!(
        "Subscribed to {}, {}, {}",
        SUBJECT_PING, SUBJECT_APPOINTMENT_VALIDATE, SUBJECT_PLANNING_DAY
    );

    let client_ping = client.clone();
    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let client_validate = client.clone();
    let validate_handle = tokio::spawn(async move {
        appointment::handle_validate(client_validate, validate_sub, scheduler).await
    });

    let client_plan = client.clone();
    let plan_handle = tokio::spawn(async move {
        planning::handle_plan_day(client_plan, plan_sub, scheduler).await
    });

    // Any handler finishing means its subscription closed
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = validate_handle => {
            error!("Appointment validate handler finished: {:?}", result);
        }
        result = plan_handle => {
            error!("Planning day handler finished: {:?}", result);
        }
    }

    Ok(())
}
