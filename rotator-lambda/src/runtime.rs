//! Lambda Runtime API client
//!
//! Polls `runtime/invocation/next`, hands each payload to a [`Handler`], and
//! posts the result to `invocation/{id}/response` or `invocation/{id}/error`.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::invocation::{Invocation, LambdaContext, LambdaErrorResponse};

const RUNTIME_API_VERSION: &str = "2018-06-01";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingEndpoint,

    #[error("Runtime API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Runtime API returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Runtime API response is missing header {0}")]
    MissingHeader(&'static str),

    #[error("Runtime API header {name} has invalid value {value:?}")]
    InvalidHeader { name: &'static str, value: String },
}

/// Function code invoked once per event
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(
        &self,
        payload: Bytes,
        context: LambdaContext,
    ) -> Result<serde_json::Value, LambdaErrorResponse>;
}

/// Client for the Runtime API exposed to `provided` runtimes
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    base_url: String,
    client: reqwest::Client,
}

impl RuntimeClient {
    /// `endpoint` is `host:port`, as found in `AWS_LAMBDA_RUNTIME_API`
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint = endpoint.trim_start_matches("http://").trim_end_matches('/');

        Self {
            base_url: format!("http://{}/{}/runtime", endpoint, RUNTIME_API_VERSION),
            // No overall timeout: invocation/next long-polls until an event arrives
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, RuntimeError> {
        std::env::var("AWS_LAMBDA_RUNTIME_API")
            .map(Self::new)
            .map_err(|_| RuntimeError::MissingEndpoint)
    }

    /// GET /runtime/invocation/next
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let path = "invocation/next";
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RuntimeError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let headers = response.headers().clone();
        let request_id = header(&headers, "Lambda-Runtime-Aws-Request-Id")?;
        let deadline = header(&headers, "Lambda-Runtime-Deadline-Ms")?;
        let deadline_ms = deadline
            .parse()
            .map_err(|_| RuntimeError::InvalidHeader {
                name: "Lambda-Runtime-Deadline-Ms",
                value: deadline,
            })?;
        let invoked_function_arn =
            header(&headers, "Lambda-Runtime-Invoked-Function-Arn").unwrap_or_default();
        let trace_id = header(&headers, "Lambda-Runtime-Trace-Id").ok();

        Ok(Invocation {
            request_id,
            invoked_function_arn,
            deadline_ms,
            trace_id,
            payload: response.bytes().await?,
        })
    }

    /// POST /runtime/invocation/{requestId}/response
    pub async fn send_response(
        &self,
        request_id: &str,
        body: &serde_json::Value,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{}/response", request_id);
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        check(response.status(), path)
    }

    /// POST /runtime/invocation/{requestId}/error
    pub async fn send_error(
        &self,
        request_id: &str,
        error: &LambdaErrorResponse,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{}/error", request_id);
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header(ERROR_TYPE_HEADER, error.error_type.as_str())
            .json(error)
            .send()
            .await?;
        check(response.status(), path)
    }

    /// POST /runtime/init/error
    pub async fn send_init_error(&self, error: &LambdaErrorResponse) -> Result<(), RuntimeError> {
        let path = "init/error".to_string();
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .header(ERROR_TYPE_HEADER, error.error_type.as_str())
            .json(error)
            .send()
            .await?;
        check(response.status(), path)
    }
}

fn header(headers: &HeaderMap, name: &'static str) -> Result<String, RuntimeError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(RuntimeError::MissingHeader(name))
}

fn check(status: reqwest::StatusCode, path: String) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Status {
            status: status.as_u16(),
            path,
        })
    }
}

/// Fetch one invocation, run the handler, and report the outcome
pub async fn run_once<H>(client: &RuntimeClient, handler: &H) -> Result<(), RuntimeError>
where
    H: Handler + ?Sized,
{
    let invocation = client.next_invocation().await?;
    serve(client, handler, invocation).await
}

async fn serve<H>(
    client: &RuntimeClient,
    handler: &H,
    invocation: Invocation,
) -> Result<(), RuntimeError>
where
    H: Handler + ?Sized,
{
    let context = LambdaContext::new(&invocation);
    let request_id = invocation.request_id.clone();

    debug!(request_id = %request_id, "Received invocation");

    match handler.call(invocation.payload, context).await {
        Ok(body) => client.send_response(&request_id, &body).await,
        Err(e) => {
            error!(
                request_id = %request_id,
                error_type = %e.error_type,
                error = %e.error_message,
                "Invocation failed"
            );
            client.send_error(&request_id, &e).await
        }
    }
}

/// Serve invocations until fetching the next one fails
///
/// A result that cannot be posted is logged and the loop moves on; the
/// Runtime API times the invocation out on its own.
pub async fn run<H>(client: &RuntimeClient, handler: &H) -> Result<(), RuntimeError>
where
    H: Handler + ?Sized,
{
    info!(endpoint = %client.base_url, "Lambda runtime started");

    loop {
        let invocation = client.next_invocation().await?;
        let request_id = invocation.request_id.clone();

        if let Err(e) = serve(client, handler, invocation).await {
            warn!(request_id = %request_id, error = %e, "Could not report invocation result");
        }
    }
}
