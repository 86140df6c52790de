//! EuPago REST client (reqwest)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GatewayError, MbwayRequest, MultibancoReference, PaymentGateway, ReferenceState};
use crate::core::EuPagoConfig;

/// HTTP client for the EuPago REST API
pub struct EuPagoClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct MultibancoCreateBody<'a> {
    chave: &'a str,
    valor: f64,
    id: &'a str,
    per_dup: u8,
}

#[derive(Serialize)]
struct MbwayCreateBody<'a> {
    chave: &'a str,
    valor: f64,
    id: &'a str,
    alias: &'a str,
    descricao: &'a str,
}

#[derive(Serialize)]
struct MultibancoInfoBody<'a> {
    chave: &'a str,
    referencia: &'a str,
    entidade: &'a str,
}

/// Common response envelope; EuPago sends numbers or strings depending on
/// the endpoint, so scalars stay loosely typed
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    sucesso: bool,
    #[serde(default)]
    resposta: Option<String>,
    #[serde(default)]
    referencia: Option<Value>,
    #[serde(default)]
    entidade: Option<Value>,
    #[serde(default)]
    valor: Option<Value>,
    #[serde(default)]
    estado_referencia: Option<String>,
}

fn scalar(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

impl GatewayResponse {
    fn into_success(self) -> Result<Self, GatewayError> {
        if self.sucesso {
            Ok(self)
        } else {
            Err(GatewayError::Rejected(
                self.resposta
                    .unwrap_or_else(|| "payment request was not accepted".to_string()),
            ))
        }
    }
}

impl EuPagoClient {
    pub fn new(config: &EuPagoConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| GatewayError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/clientes/rest_api/{path}", self.base_url)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<GatewayResponse, GatewayError> {
        if self.api_key.is_empty() {
            return Err(GatewayError::NotConfigured);
        }

        let url = self.url(path);
        tracing::debug!(%url, "EuPago request");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Transport(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<GatewayResponse>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?
            .into_success()
    }
}

#[async_trait]
impl PaymentGateway for EuPagoClient {
    async fn create_multibanco(
        &self,
        identifier: &str,
        amount: f64,
    ) -> Result<MultibancoReference, GatewayError> {
        let body = MultibancoCreateBody {
            chave: &self.api_key,
            valor: amount,
            id: identifier,
            per_dup: 0,
        };
        let resp = self.post("multibanco/create", &body).await?;

        let reference = scalar(&resp.referencia)
            .ok_or_else(|| GatewayError::InvalidResponse("missing referencia".into()))?;
        let entity = scalar(&resp.entidade)
            .ok_or_else(|| GatewayError::InvalidResponse("missing entidade".into()))?;
        Ok(MultibancoReference {
            entity,
            reference,
            amount: number(&resp.valor).unwrap_or(amount),
        })
    }

    async fn create_mbway(
        &self,
        identifier: &str,
        amount: f64,
        phone: &str,
        description: &str,
    ) -> Result<MbwayRequest, GatewayError> {
        let body = MbwayCreateBody {
            chave: &self.api_key,
            valor: amount,
            id: identifier,
            alias: phone,
            descricao: description,
        };
        let resp = self.post("mbway/create", &body).await?;

        let reference = scalar(&resp.referencia)
            .ok_or_else(|| GatewayError::InvalidResponse("missing referencia".into()))?;
        Ok(MbwayRequest {
            reference,
            amount: number(&resp.valor).unwrap_or(amount),
        })
    }

    async fn multibanco_status(
        &self,
        reference: &str,
        entity: &str,
    ) -> Result<ReferenceState, GatewayError> {
        let body = MultibancoInfoBody {
            chave: &self.api_key,
            referencia: reference,
            entidade: entity,
        };
        let resp = self.post("multibanco/info", &body).await?;
        Ok(resp
            .estado_referencia
            .as_deref()
            .map(ReferenceState::from_eupago)
            .unwrap_or(ReferenceState::Unknown))
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multibanco_response() {
        let resp: GatewayResponse = serde_json::from_str(
            r#"{"sucesso":true,"estado":0,"resposta":"OK","referencia":"123 456 789","valor":"25.50","entidade":11249}"#,
        )
        .unwrap();
        let resp = resp.into_success().unwrap();
        assert_eq!(scalar(&resp.referencia).as_deref(), Some("123 456 789"));
        assert_eq!(scalar(&resp.entidade).as_deref(), Some("11249"));
        assert_eq!(number(&resp.valor), Some(25.5));
    }

    #[test]
    fn failure_carries_resposta() {
        let resp: GatewayResponse =
            serde_json::from_str(r#"{"sucesso":false,"estado":-10,"resposta":"Chave invalida"}"#)
                .unwrap();
        match resp.into_success() {
            Err(GatewayError::Rejected(msg)) => assert_eq!(msg, "Chave invalida"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let client = EuPagoClient::new(&EuPagoConfig {
            api_key: "k".into(),
            base_url: "https://sandbox.eupago.pt/".into(),
            timeout_ms: 1_000,
        })
        .unwrap();
        assert_eq!(
            client.url("multibanco/create"),
            "https://sandbox.eupago.pt/clientes/rest_api/multibanco/create"
        );
    }

    #[tokio::test]
    async fn unconfigured_key_fails_fast() {
        let client = EuPagoClient::new(&EuPagoConfig::default()).unwrap();
        assert!(matches!(
            client.create_multibanco("1", 10.0).await,
            Err(GatewayError::NotConfigured)
        ));
    }
}
