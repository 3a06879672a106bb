//! Adapter between the Lambda runtime loop and the rotation handler

use async_trait::async_trait;
use bytes::Bytes;
use rotator_core::{RotationEvent, RotatorError};
use rotator_lambda::{Handler, LambdaContext, LambdaErrorResponse};
use serde_json::{json, Value};
use tracing::{info_span, Instrument};

use crate::rotation::Rotator;

pub struct RotationHandler {
    rotator: Rotator,
}

impl RotationHandler {
    pub fn new(rotator: Rotator) -> Self {
        Self { rotator }
    }
}

fn error_response(error: &RotatorError) -> LambdaErrorResponse {
    LambdaErrorResponse::new(error.error_type(), error.error_message())
}

#[async_trait]
impl Handler for RotationHandler {
    async fn call(
        &self,
        payload: Bytes,
        context: LambdaContext,
    ) -> Result<Value, LambdaErrorResponse> {
        let span = info_span!("invocation", request_id = %context.aws_request_id);

        async {
            let event = RotationEvent::from_slice(&payload).map_err(|e| error_response(&e))?;
            self.rotator
                .handle(&event)
                .await
                .map_err(|e| error_response(&e))?;
            Ok(json!({ "message": "ok" }))
        }
        .instrument(span)
        .await
    }
}
