use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::ApiError;

pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

const MAX_WEBHOOK_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct VerifySigState {
    pub hmac_secret: String,
}

/// Rejects requests whose body does not match the hex HMAC-SHA256 in [`SIGNATURE_HEADER`].
pub async fn ver_sig(
    State(state): State<VerifySigState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = req.into_parts();

    let mut hmac = Hmac::<Sha256>::new_from_slice(state.hmac_secret.as_bytes())
        .map_err(ApiError::unexpected("verifying webhook signature"))?;

    let body_bytes = axum::body::to_bytes(body, MAX_WEBHOOK_BYTES)
        .await
        .map_err(|err| {
            tracing::warn!(%err, "could not read webhook payload");
            ApiError::PayloadTooLarge("webhook payload exceeds 2 MiB or was cut short")
        })?;

    hmac.update(body_bytes.as_ref());

    let signature = parts
        .headers
        .get(SIGNATURE_HEADER)
        .ok_or(ApiError::Unauthorized("X-Webhook-Signature header missing"))?;
    let signature = hex::decode(signature.as_bytes())
        .map_err(|_| ApiError::Unauthorized("X-Webhook-Signature header invalid"))?;

    if hmac.verify_slice(&signature).is_err() {
        tracing::warn!("rejected webhook with bad signature");
        return Err(ApiError::Unauthorized("webhook signature mismatch"));
    }

    Ok(next
        .run(Request::from_parts(parts, Body::from(body_bytes)))
        .await)
}
