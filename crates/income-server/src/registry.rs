//! [`HttpRegistry`] — the HTTP client for the external income registry.

use std::time::Duration;

use income_core::{
  period::YearMonth,
  registry::{IncomeRegistry, RegistryError, RegistryRequest},
  snapshot::IncomeDocument,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info, warn};
use ulid::Ulid;

use crate::ServerConfig;

/// Body of the registry's income-list query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncomeListQuery<'a> {
  ainntektsfilter: &'a str,
  formaal:         &'a str,
  ident:           Ident<'a>,
  maaned_fom:      YearMonth,
  maaned_tom:      YearMonth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Ident<'a> {
  identifikator: &'a str,
  aktoer_type:   &'static str,
}

/// Async HTTP client for the income registry.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpRegistry {
  client:        Client,
  url:           String,
  token:         Option<String>,
  consumer_id:   String,
  income_filter: String,
  purpose:       String,
}

impl HttpRegistry {
  pub fn new(cfg: &ServerConfig) -> reqwest::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(cfg.registry_timeout_secs))
      .build()?;
    Ok(Self {
      client,
      url:           cfg.registry_url.clone(),
      token:         cfg.registry_token.clone(),
      consumer_id:   cfg.consumer_id.clone(),
      income_filter: cfg.income_filter.clone(),
      purpose:       cfg.purpose.clone(),
    })
  }

  async fn post(&self, request: &RegistryRequest) -> Result<IncomeDocument, RegistryError> {
    let query = IncomeListQuery {
      ainntektsfilter: &self.income_filter,
      formaal:         &self.purpose,
      ident:           Ident {
        identifikator: &request.identity_id,
        aktoer_type:   "AKTOER_ID",
      },
      maaned_fom:      request.from_month,
      maaned_tom:      request.to_month,
    };

    let mut req = self
      .client
      .post(&self.url)
      .header("Nav-Consumer-Id", &self.consumer_id)
      .header("Nav-Call-Id", Ulid::new().to_string())
      .json(&query);
    if let Some(token) = &self.token {
      req = req.bearer_auth(token);
    }

    let resp = req.send().await.map_err(transport_error)?;
    let status = resp.status();

    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(RegistryError {
        status:  status.as_u16(),
        message: failure_message(status, &body),
      });
    }

    resp
      .json::<serde_json::Value>()
      .await
      .map(IncomeDocument)
      .map_err(|e| RegistryError {
        status:  StatusCode::BAD_GATEWAY.as_u16(),
        message: format!("undecodable registry response: {e}"),
      })
  }
}

impl IncomeRegistry for HttpRegistry {
  async fn fetch(
    &self,
    request: RegistryRequest,
  ) -> Result<IncomeDocument, RegistryError> {
    info!(
      from = %request.from_month,
      to = %request.to_month,
      "fetching income from registry"
    );
    let result = self.post(&request).await;
    if let Err(e) = &result {
      warn!(status = e.status, "registry fetch failed: {}", e.message);
    }
    result
  }
}

fn transport_error(e: reqwest::Error) -> RegistryError {
  let status = if e.is_timeout() {
    StatusCode::GATEWAY_TIMEOUT
  } else {
    StatusCode::BAD_GATEWAY
  };
  RegistryError { status: status.as_u16(), message: format!("registry unreachable: {e}") }
}

/// Prefer the `message` field of a JSON error body, falling back to the raw
/// body and then to the status reason.
fn failure_message(status: StatusCode, body: &str) -> String {
  let problem = serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
    .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_owned()))
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());
  format!("failed to fetch income ({status}): {problem}")
}

#[cfg(test)]
mod tests {
  use std::{net::SocketAddr, path::PathBuf};

  use axum::{Json, Router, http::HeaderMap, routing::post};
  use serde_json::{Value, json};
  use tokio::net::TcpListener;

  use super::*;

  async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    addr
  }

  fn config(addr: SocketAddr, token: Option<&str>) -> ServerConfig {
    ServerConfig {
      host:                  "127.0.0.1".into(),
      port:                  0,
      store_path:            PathBuf::from(":memory:"),
      registry_url:          format!("http://{addr}/hentinntektliste"),
      registry_token:        token.map(str::to_owned),
      consumer_id:           "test-consumer".into(),
      registry_timeout_secs: 5,
      income_filter:         "filter".into(),
      purpose:               "purpose".into(),
    }
  }

  fn request() -> RegistryRequest {
    RegistryRequest {
      identity_id: "12345678901".into(),
      from_month:  YearMonth::new(2021, 1).unwrap(),
      to_month:    YearMonth::new(2023, 12).unwrap(),
    }
  }

  #[tokio::test]
  async fn posts_query_and_returns_document() {
    let app = Router::new().route(
      "/hentinntektliste",
      post(|headers: HeaderMap, Json(body): Json<Value>| async move {
        assert_eq!(
          headers.get("authorization").unwrap(),
          "Bearer secret"
        );
        assert_eq!(headers.get("nav-consumer-id").unwrap(), "test-consumer");
        assert!(headers.get("nav-call-id").is_some());
        assert_eq!(
          body,
          json!({
            "ainntektsfilter": "filter",
            "formaal": "purpose",
            "ident": { "identifikator": "12345678901", "aktoerType": "AKTOER_ID" },
            "maanedFom": "2021-01",
            "maanedTom": "2023-12",
          })
        );
        Json(json!({ "total": 50000 }))
      }),
    );
    let addr = serve(app).await;

    let registry = HttpRegistry::new(&config(addr, Some("secret"))).unwrap();
    let doc = registry.fetch(request()).await.unwrap();
    assert_eq!(doc, IncomeDocument(json!({ "total": 50000 })));
  }

  #[tokio::test]
  async fn error_status_and_message_are_carried() {
    let app = Router::new().route(
      "/hentinntektliste",
      post(|| async {
        (
          axum::http::StatusCode::FORBIDDEN,
          Json(json!({ "message": "no access to identity" })),
        )
      }),
    );
    let addr = serve(app).await;

    let registry = HttpRegistry::new(&config(addr, None)).unwrap();
    let err = registry.fetch(request()).await.unwrap_err();
    assert_eq!(err.status, 403);
    assert!(err.message.contains("no access to identity"));
  }

  #[tokio::test]
  async fn unreachable_registry_is_bad_gateway() {
    // Bind then drop so the port is very likely closed.
    let addr = {
      let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
      l.local_addr().unwrap()
    };
    let registry = HttpRegistry::new(&config(addr, None)).unwrap();
    let err = registry.fetch(request()).await.unwrap_err();
    assert_eq!(err.status, 502);
  }

  #[test]
  fn failure_message_fallbacks() {
    let s = StatusCode::INTERNAL_SERVER_ERROR;
    assert!(failure_message(s, r#"{"message":"boom"}"#).ends_with("boom"));
    assert!(failure_message(s, "plain text").ends_with("plain text"));
    assert!(failure_message(s, "").ends_with("Internal Server Error"));
  }
}
