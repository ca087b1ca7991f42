use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    dtos::{CheckoutRequest, CreateOrderResponse, ExecutionQuery, StatusResponse, WebhookEvent},
    error::ApiError,
    models::{NewPayment, PaymentExecution},
    processor::ProcessorOutcome,
    AppState,
};

pub async fn create_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    let body: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::invalid_input("request body must be valid JSON"))?;
    let checkout = CheckoutRequest::from_json(&body, &state.checkout.default_currency)?;
    let new_payment = NewPayment::sale(&checkout, &state.checkout);

    let outcome = state
        .processor
        .create_payment(&new_payment)
        .await
        .map_err(ApiError::unexpected("creating order"))?;

    match outcome {
        ProcessorOutcome::Completed(payment) => match payment.approval_url().map(str::to_string) {
            Some(approval_url) => {
                tracing::info!(payment_id = %payment.id, %approval_url, "payment created");
                Ok(Json(CreateOrderResponse {
                    approval_url,
                    payment_id: payment.id,
                }))
            }
            None => {
                tracing::error!(payment_id = %payment.id, "processor returned no approval link");
                Err(ApiError::ProcessorRejected(json!({
                    "name": "MISSING_APPROVAL_URL",
                    "message": "payment processor response did not include an approval link",
                    "payment_id": payment.id,
                })))
            }
        },
        ProcessorOutcome::Rejected(detail) => {
            tracing::error!(%detail, "payment creation rejected");
            Err(ApiError::ProcessorRejected(detail))
        }
    }
}

pub async fn execute_payment(
    State(state): State<AppState>,
    query: Result<Query<ExecutionQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    let (payment_id, payer_id) = query.require()?;
    tracing::info!(%payment_id, %payer_id, "executing payment");

    let payment = match state
        .processor
        .find_payment(&payment_id)
        .await
        .map_err(ApiError::unexpected("looking up payment"))?
    {
        ProcessorOutcome::Completed(payment) => payment,
        ProcessorOutcome::Rejected(detail) => {
            tracing::error!(%payment_id, %detail, "payment lookup rejected");
            return Err(ApiError::ProcessorRejected(detail));
        }
    };

    let execution = PaymentExecution { payer_id };
    match state
        .processor
        .execute_payment(&payment.id, &execution)
        .await
        .map_err(ApiError::unexpected("executing payment"))?
    {
        ProcessorOutcome::Completed(_) => {
            tracing::info!(payment_id = %payment.id, "payment executed successfully");
            Ok(Json(StatusResponse {
                status: "Payment executed successfully",
            }))
        }
        ProcessorOutcome::Rejected(detail) => {
            tracing::error!(payment_id = %payment.id, %detail, "payment execution rejected");
            Err(ApiError::ProcessorRejected(detail))
        }
    }
}

/// Acknowledges every well-formed event; only sale completion is logged at info.
pub async fn paypal_webhook(body: Bytes) -> Result<Json<StatusResponse>, ApiError> {
    let body: Value =
        serde_json::from_slice(&body).map_err(ApiError::unexpected("parsing webhook payload"))?;
    let event = WebhookEvent::from_json(&body);

    if event.is_sale_completed() {
        tracing::info!(
            event_id = ?event.id,
            sale_id = ?event.resource_id,
            "payment sale completed event received"
        );
    } else {
        tracing::debug!(event_type = ?event.event_type, "ignoring webhook event");
    }

    Ok(Json(StatusResponse { status: "success" }))
}
