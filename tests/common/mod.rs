#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use checkout_gateway::{
    config::CheckoutSettings,
    create_routes,
    models::{Link, NewPayment, Payment, PaymentExecution},
    processor::{PaymentProcessor, ProcessorError, ProcessorOutcome, ProcessorResult},
    AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const APPROVE_URL: &str = "https://processor.example/approve";

/// What the fake processor answers for one kind of call.
#[derive(Clone)]
pub enum Reply {
    Completed(Payment),
    Rejected(Value),
    Unavailable,
}

impl Reply {
    fn into_result(self) -> ProcessorResult<Payment> {
        match self {
            Reply::Completed(payment) => Ok(ProcessorOutcome::Completed(payment)),
            Reply::Rejected(detail) => Ok(ProcessorOutcome::Rejected(detail)),
            Reply::Unavailable => Err(ProcessorError::UnexpectedStatus {
                status: 503,
                body: "upstream connect error at 10.1.2.3".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MockProcessor {
    create_reply: Option<Reply>,
    find_reply: Option<Reply>,
    execute_reply: Option<Reply>,
    pub created: Mutex<Vec<NewPayment>>,
    pub found: Mutex<Vec<String>>,
    pub executed: Mutex<Vec<(String, PaymentExecution)>>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(mut self, reply: Reply) -> Self {
        self.create_reply = Some(reply);
        self
    }

    pub fn on_find(mut self, reply: Reply) -> Self {
        self.find_reply = Some(reply);
        self
    }

    pub fn on_execute(mut self, reply: Reply) -> Self {
        self.execute_reply = Some(reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.created.lock().unwrap().len()
            + self.found.lock().unwrap().len()
            + self.executed.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_payment(&self, payment: &NewPayment) -> ProcessorResult<Payment> {
        self.created.lock().unwrap().push(payment.clone());
        self.create_reply
            .clone()
            .expect("create_payment was not scripted")
            .into_result()
    }

    async fn find_payment(&self, payment_id: &str) -> ProcessorResult<Payment> {
        self.found.lock().unwrap().push(payment_id.to_string());
        self.find_reply
            .clone()
            .expect("find_payment was not scripted")
            .into_result()
    }

    async fn execute_payment(
        &self,
        payment_id: &str,
        execution: &PaymentExecution,
    ) -> ProcessorResult<Payment> {
        self.executed
            .lock()
            .unwrap()
            .push((payment_id.to_string(), execution.clone()));
        self.execute_reply
            .clone()
            .expect("execute_payment was not scripted")
            .into_result()
    }
}

pub fn payment(id: &str, links: &[(&str, &str)]) -> Payment {
    Payment {
        id: id.to_string(),
        state: Some("created".to_string()),
        links: links
            .iter()
            .map(|(rel, href)| Link {
                href: href.to_string(),
                rel: rel.to_string(),
                method: None,
            })
            .collect(),
    }
}

pub fn checkout_settings() -> CheckoutSettings {
    CheckoutSettings {
        brand_name: "ASAS For Furniture".to_string(),
        description: "This is the payment transaction description.".to_string(),
        default_currency: "USD".to_string(),
        return_url: "https://shop.example/execute-payment".to_string(),
        cancel_url: "https://shop.example/".to_string(),
    }
}

pub fn app(processor: &Arc<MockProcessor>) -> Router {
    app_with_secret(processor, None)
}

pub fn app_with_secret(processor: &Arc<MockProcessor>, webhook_secret: Option<&str>) -> Router {
    let state = AppState {
        processor: processor.clone(),
        checkout: Arc::new(checkout_settings()),
    };
    create_routes(state, webhook_secret.map(str::to_string))
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
