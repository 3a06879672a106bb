//! Invocation data delivered by the Lambda Runtime API

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// An invocation fetched from `runtime/invocation/next`
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    pub invoked_function_arn: String,
    pub deadline_ms: i64,
    pub trace_id: Option<String>,
    pub payload: Bytes,
}

/// Lambda error response format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaErrorResponse {
    pub error_message: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<Vec<String>>,
}

impl LambdaErrorResponse {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
            stack_trace: None,
        }
    }
}

/// Lambda context passed to the handler
#[derive(Debug, Clone, Serialize)]
pub struct LambdaContext {
    pub aws_request_id: String,
    pub invoked_function_arn: String,
    pub function_name: String,
    pub function_version: String,
    pub memory_limit_in_mb: i32,
    pub log_group_name: String,
    pub log_stream_name: String,
    pub deadline_ms: i64,
    pub trace_id: Option<String>,
}

impl LambdaContext {
    /// Build the context from an invocation and the function's environment
    pub fn new(invocation: &Invocation) -> Self {
        let env = |key: &str| std::env::var(key).unwrap_or_default();

        Self {
            aws_request_id: invocation.request_id.clone(),
            invoked_function_arn: invocation.invoked_function_arn.clone(),
            function_name: env("AWS_LAMBDA_FUNCTION_NAME"),
            function_version: std::env::var("AWS_LAMBDA_FUNCTION_VERSION")
                .unwrap_or_else(|_| "$LATEST".to_string()),
            memory_limit_in_mb: env("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")
                .parse()
                .unwrap_or(128),
            log_group_name: env("AWS_LAMBDA_LOG_GROUP_NAME"),
            log_stream_name: env("AWS_LAMBDA_LOG_STREAM_NAME"),
            deadline_ms: invocation.deadline_ms,
            trace_id: invocation.trace_id.clone(),
        }
    }

    /// Get remaining time in milliseconds
    pub fn get_remaining_time_in_millis(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        (self.deadline_ms - now).max(0)
    }
}
