use serde::{Deserialize, Serialize};

use crate::{config::CheckoutSettings, dtos::CheckoutRequest};

pub const APPROVAL_LINK_REL: &str = "approval_url";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Sale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Paypal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payer {
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Amount {
    pub total: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub amount: Amount,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedirectUrls {
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationContext {
    pub brand_name: String,
}

/// Body of a payment-creation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPayment {
    pub intent: Intent,
    pub payer: Payer,
    pub transactions: Vec<Transaction>,
    pub redirect_urls: RedirectUrls,
    pub application_context: ApplicationContext,
}

impl NewPayment {
    /// Single-line-item sale for a validated checkout.
    pub fn sale(checkout: &CheckoutRequest, settings: &CheckoutSettings) -> Self {
        NewPayment {
            intent: Intent::Sale,
            payer: Payer {
                payment_method: PaymentMethod::Paypal,
            },
            transactions: vec![Transaction {
                amount: Amount {
                    total: checkout.formatted_total(),
                    currency: checkout.currency.clone(),
                },
                description: settings.description.clone(),
            }],
            redirect_urls: RedirectUrls {
                return_url: settings.return_url.clone(),
                cancel_url: settings.cancel_url.clone(),
            },
            application_context: ApplicationContext {
                brand_name: settings.brand_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Payment {
    pub fn approval_url(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == APPROVAL_LINK_REL)
            .map(|link| link.href.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentExecution {
    pub payer_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}
