use rotator_core::{RotationStep, RotatorError, RotatorResult, VersionStage};
use tracing::{debug, info};

use super::StepContext;

const STEP: RotationStep = RotationStep::SetSecret;

/// Push the pending credential to the resource and mark the version as set
pub(super) async fn set_secret(ctx: &StepContext<'_>) -> RotatorResult<()> {
    let pending = ctx.pending_payload(STEP).await?;

    if !ctx.resource.requires_set() {
        debug!("Resource needs no set step");
        return Ok(());
    }

    ctx.resource
        .set_credential(&pending)
        .await
        .map_err(|e| e.into_rotator_error(STEP))?;

    let marker = VersionStage::set_marker();
    let holder = ctx.description.version_with_stage(&marker);
    if holder == Some(ctx.token) {
        debug!("Version already marked as set");
        return Ok(());
    }

    ctx.store
        .update_secret_version_stage(ctx.secret_id, &marker, Some(ctx.token), holder)
        .await
        .map_err(|e| RotatorError::set_failed(format!("cannot mark version as set: {}", e)))?;

    info!(
        credential_id = ?pending.credential_id(),
        "Credential set"
    );
    Ok(())
}
