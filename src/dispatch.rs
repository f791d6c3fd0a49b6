//! Authenticated request dispatcher.
//!
//! Every API call runs through [`Dispatcher::dispatch`]: obtain a valid token,
//! send, classify the response, and on an `Expired` signal refresh the token
//! and resend while the call's [`RetryBudget`] allows it.
//!
//! ```text
//! INIT --token valid--> SEND
//! INIT --token invalid--> LOGIN --> SEND          (login failure ends the call)
//! SEND --transport error--> FAILED
//! SEND --Expired, budget left--> LOGIN(forced) --> SEND
//! SEND --Expired, budget spent--> FAILED
//! SEND --other provider error--> FAILED
//! SEND --status >= 400--> FAILED
//! SEND --ok--> DONE
//! ```

use crate::endpoint::RouteTable;
use crate::error::is_expired_signal;
use crate::request::{RequestBody, RequestDescription};
use crate::retry::RetryBudget;
use crate::session::SessionManager;
use crate::{Error, Response, Result};
use http::header::AUTHORIZATION;
use http::StatusCode;
use serde_json::Value;
use std::time::Instant;

/// How a single provider response is treated.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Verdict {
    Success(Value),
    /// The token was rejected as expired; eligible for refresh-and-resend.
    Expired(Value),
    /// Any other `error` reported in the body.
    Business(Value),
    /// Status of 400 or above, with the body if it was JSON.
    HttpFailure(Option<Value>),
}

/// Classifies a response by status and raw body.
///
/// A body `error` field takes precedence over the status code, matching how
/// the provider reports token expiry. A 2xx body that is not JSON is a
/// transport failure; an error status with a non-JSON body is an HTTP failure.
pub(crate) fn classify(status: StatusCode, raw_body: &str) -> Result<Verdict> {
    let body = match serde_json::from_str::<Value>(raw_body) {
        Ok(body) => body,
        Err(_) if status.as_u16() >= 400 => return Ok(Verdict::HttpFailure(None)),
        Err(e) => {
            return Err(Error::DeserializationFailed {
                raw_response: raw_body.to_string(),
                serde_error: e.to_string(),
                status,
            })
        }
    };

    if body.get("error").is_some_and(is_truthy) {
        if is_expired_signal(&body) {
            return Ok(Verdict::Expired(body));
        }
        return Ok(Verdict::Business(body));
    }

    if status.as_u16() >= 400 {
        return Ok(Verdict::HttpFailure(Some(body)));
    }

    Ok(Verdict::Success(body))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) struct Dispatcher {
    pub session: SessionManager,
    pub routes: RouteTable,
    pub retry_limit: u32,
}

impl Dispatcher {
    /// Executes one logical authenticated call.
    pub async fn dispatch(&self, request: &RequestDescription) -> Result<Response<Value>> {
        let start_time = Instant::now();
        let mut budget = RetryBudget::new(self.retry_limit);
        let mut token = self.session.valid_token().await?;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let response = self.send(request, &token, attempt).await?;
            let status = response.status();
            let headers = response.headers().clone();
            let raw_body = response.text().await.map_err(Error::from_transport)?;
            let latency = start_time.elapsed();

            tracing::info!(
                status = status.as_u16(),
                latency_ms = latency.as_millis(),
                attempt = attempt,
                endpoint = %request.endpoint,
                "Received HTTP response"
            );

            let verdict = classify(status, &raw_body).inspect_err(|e| {
                tracing::error!(error = %e, raw_response = %raw_body, "Failed to deserialize response");
            })?;

            match verdict {
                Verdict::Success(body) => {
                    return Ok(Response::new(
                        body, raw_body, status, headers, latency, attempt,
                    ));
                }
                Verdict::Expired(payload) => {
                    if !budget.consume() {
                        tracing::warn!(
                            attempt = attempt,
                            endpoint = %request.endpoint,
                            "Token still rejected as expired, retry budget exhausted"
                        );
                        return Err(Error::Business { payload });
                    }

                    tracing::warn!(
                        attempt = attempt,
                        remaining = budget.remaining(),
                        endpoint = %request.endpoint,
                        "Token rejected as expired, refreshing and resending"
                    );
                    let refreshed = self.session.refresh(&token).await?;
                    token = refreshed;
                }
                Verdict::Business(payload) => {
                    tracing::warn!(
                        endpoint = %request.endpoint,
                        error = %payload["error"],
                        "Provider reported an error"
                    );
                    return Err(Error::Business { payload });
                }
                Verdict::HttpFailure(payload) => {
                    if status.is_server_error() {
                        tracing::warn!(status = status.as_u16(), response = %raw_body, "Server error (5xx)");
                    } else {
                        tracing::error!(status = status.as_u16(), response = %raw_body, "Client error (4xx)");
                    }
                    return Err(Error::HttpError {
                        status,
                        raw_response: raw_body,
                        payload,
                        headers,
                    });
                }
            }
        }
    }

    /// Sends one attempt with fresh `apikey` and `authorization` headers.
    async fn send(
        &self,
        request: &RequestDescription,
        token: &str,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        let url = request.url(self.session.base_url())?;
        let scheme = self.routes.auth_scheme(request.endpoint);

        tracing::debug!(
            method = %request.method(),
            url = %url,
            attempt = attempt,
            scheme = ?scheme,
            "Executing HTTP request"
        );

        let builder = self
            .session
            .request(request.method(), url)
            .headers(request.headers.clone())
            .header(AUTHORIZATION, scheme.header_value(token));

        let builder = match &request.body {
            Some(RequestBody::Json(json)) => builder.json(json),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        builder.send().await.map_err(Error::from_transport)
    }
}
