//! EuPago payment gateway
//!
//! [`PaymentGateway`] is the seam handlers talk to; [`EuPagoClient`] is the
//! REST implementation. Tests plug in their own gateway.
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | Multibanco reference | `POST /clientes/rest_api/multibanco/create` |
//! | MB WAY request | `POST /clientes/rest_api/mbway/create` |
//! | Multibanco status | `POST /clientes/rest_api/multibanco/info` |
//!
//! Payment confirmations arrive on the callback route as query parameters
//! ([`CallbackParams`]).

mod client;

pub use client::EuPagoClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::AppError;

/// Gateway failures
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered `sucesso: false`
    #[error("gateway rejected the request: {0}")]
    Rejected(String),

    #[error("gateway request failed: {0}")]
    Transport(String),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),

    #[error("gateway is not configured")]
    NotConfigured,
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        tracing::warn!(error = %err, "Payment gateway error");
        AppError::gateway(err.to_string())
    }
}

/// Multibanco reference to show the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultibancoReference {
    pub entity: String,
    pub reference: String,
    pub amount: f64,
}

/// MB WAY request accepted by the gateway (customer approves in the app)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbwayRequest {
    pub reference: String,
    pub amount: f64,
}

/// Reference state reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceState {
    Paid,
    Pending,
    Expired,
    Unknown,
}

impl ReferenceState {
    /// Map EuPago's `estado_referencia`
    pub fn from_eupago(state: &str) -> Self {
        match state.trim().to_ascii_lowercase().as_str() {
            "paga" | "pago" | "paid" => ReferenceState::Paid,
            "pendente" | "pending" => ReferenceState::Pending,
            "expirada" | "expired" => ReferenceState::Expired,
            _ => ReferenceState::Unknown,
        }
    }
}

/// Payment gateway seam
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a Multibanco reference for `amount`; `identifier` is echoed back
    /// on the callback
    async fn create_multibanco(
        &self,
        identifier: &str,
        amount: f64,
    ) -> Result<MultibancoReference, GatewayError>;

    /// Push an MB WAY request to `phone` (`351#9XXXXXXXX`)
    async fn create_mbway(
        &self,
        identifier: &str,
        amount: f64,
        phone: &str,
        description: &str,
    ) -> Result<MbwayRequest, GatewayError>;

    /// Ask for the state of a Multibanco reference
    async fn multibanco_status(
        &self,
        reference: &str,
        entity: &str,
    ) -> Result<ReferenceState, GatewayError>;

    /// API key; callbacks must present the same value in `chave_api`
    fn api_key(&self) -> &str;
}

/// Query parameters of the EuPago callback
///
/// `GET /api/payments/eupago/callback?valor=&canal=&referencia=&transacao=&identificador=&mp=&chave_api=&data=&entidade=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub valor: Option<String>,
    pub canal: Option<String>,
    pub referencia: Option<String>,
    pub transacao: Option<String>,
    pub identificador: Option<String>,
    /// Payment method code (e.g. `PC:PT` Multibanco, `MW:PT` MB WAY)
    pub mp: Option<String>,
    pub chave_api: Option<String>,
    pub data: Option<String>,
    pub entidade: Option<String>,
}

impl CallbackParams {
    /// Amount paid; EuPago may send a decimal comma
    pub fn amount(&self) -> Option<f64> {
        self.valor
            .as_deref()
            .and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Our payment id, when the identifier is one
    pub fn payment_id(&self) -> Option<i64> {
        self.identificador
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
    }

    /// Constant-time comparison of `chave_api` against the configured key
    pub fn key_matches(&self, expected: &str) -> bool {
        let Some(given) = self.chave_api.as_deref() else {
            return false;
        };
        if expected.is_empty() {
            return false;
        }
        ring::constant_time::verify_slices_are_equal(given.as_bytes(), expected.as_bytes()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorCode;

    #[test]
    fn callback_parsing() {
        let params = CallbackParams {
            valor: Some("25,50".into()),
            identificador: Some("123456789".into()),
            chave_api: Some("demo-key".into()),
            ..Default::default()
        };
        assert_eq!(params.amount(), Some(25.5));
        assert_eq!(params.payment_id(), Some(123456789));
        assert!(params.key_matches("demo-key"));
        assert!(!params.key_matches("other-key"));
        assert!(!params.key_matches(""));
        assert!(!CallbackParams::default().key_matches("demo-key"));
    }

    #[test]
    fn reference_state_mapping() {
        assert_eq!(ReferenceState::from_eupago("paga"), ReferenceState::Paid);
        assert_eq!(ReferenceState::from_eupago("Pendente"), ReferenceState::Pending);
        assert_eq!(ReferenceState::from_eupago("???"), ReferenceState::Unknown);
    }

    #[test]
    fn gateway_errors_are_bad_gateway() {
        let err: AppError = GatewayError::Rejected("Chave inválida".into()).into();
        assert_eq!(err.code, ErrorCode::PaymentGatewayError);
        assert_eq!(err.http_status(), http::StatusCode::BAD_GATEWAY);
    }
}
