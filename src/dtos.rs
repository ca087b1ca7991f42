use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const SALE_COMPLETED: &str = "PAYMENT.SALE.COMPLETED";

/// A validated order-creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub amount: Decimal,
    pub currency: String,
}

impl CheckoutRequest {
    /// Validates a raw request body. `total_price` wins over `amount` when both are sent.
    pub fn from_json(body: &Value, default_currency: &str) -> Result<Self, ApiError> {
        let body = body
            .as_object()
            .ok_or_else(|| ApiError::invalid_input("request body must be a JSON object"))?;

        let raw_amount = field(body, "total_price")
            .or_else(|| field(body, "amount"))
            .ok_or_else(|| ApiError::invalid_input("amount required"))?;

        let amount = parse_amount(raw_amount)?;

        let currency = match field(body, "currency") {
            None => default_currency.to_string(),
            Some(Value::String(code)) if !code.trim().is_empty() => code.trim().to_string(),
            Some(_) => return Err(ApiError::invalid_input("currency must be a non-empty string")),
        };

        Ok(CheckoutRequest { amount, currency })
    }

    pub fn formatted_total(&self) -> String {
        format!("{:.2}", self.amount.round_dp(2))
    }
}

fn field<'a>(body: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|value| !value.is_null())
}

/// Numeric means "parses as a finite float"; representability is checked afterwards.
fn parse_amount(value: &Value) -> Result<Decimal, ApiError> {
    let not_numeric = || ApiError::invalid_input("amount must be numeric");
    let not_positive = || ApiError::invalid_input("amount must be positive");

    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(not_numeric()),
    };
    let float = text
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(not_numeric)?;

    // The processor only sees two decimal places.
    if float < 0.005 {
        return Err(not_positive());
    }

    let amount = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .or_else(|_| Decimal::try_from(float))
        .map_err(|_| ApiError::invalid_input("amount is too large"))?;

    if amount.round_dp(2) <= Decimal::ZERO {
        return Err(not_positive());
    }
    Ok(amount)
}

#[derive(Debug, serde::Deserialize)]
pub struct ExecutionQuery {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
}

impl ExecutionQuery {
    /// Returns `(payment_id, payer_id)` once both are present.
    pub fn require(self) -> Result<(String, String), ApiError> {
        let payment_id = present(self.payment_id)
            .ok_or_else(|| ApiError::invalid_input("paymentId required"))?;
        let payer_id =
            present(self.payer_id).ok_or_else(|| ApiError::invalid_input("PayerID required"))?;
        Ok((payment_id, payer_id))
    }
}

fn present(param: Option<String>) -> Option<String> {
    param.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, serde::Serialize)]
pub struct CreateOrderResponse {
    pub approval_url: String,
    #[serde(rename = "paymentID")]
    pub payment_id: String,
}

#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Only the fields this service looks at; everything else in the event is ignored.
#[derive(Debug, Default, PartialEq)]
pub struct WebhookEvent {
    pub id: Option<String>,
    pub event_type: Option<String>,
    pub resource_id: Option<String>,
}

impl WebhookEvent {
    pub fn from_json(body: &Value) -> Self {
        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);
        WebhookEvent {
            id: text(body.get("id")),
            event_type: text(body.get("event_type")),
            resource_id: text(body.get("resource").and_then(|resource| resource.get("id"))),
        }
    }

    pub fn is_sale_completed(&self) -> bool {
        self.event_type.as_deref() == Some(SALE_COMPLETED)
    }
}
