use rotator_core::{RotationStep, RotatorError, RotatorResult, VersionStage};
use tracing::info;

use super::StepContext;

const STEP: RotationStep = RotationStep::TestSecret;

/// Verify the pending credential works; never touches stages
pub(super) async fn test_secret(ctx: &StepContext<'_>) -> RotatorResult<()> {
    let pending = ctx.pending_payload(STEP).await?;

    if ctx.resource.requires_set()
        && !ctx
            .description
            .version_has_stage(ctx.token, &VersionStage::set_marker())
    {
        return Err(RotatorError::test_failed(
            "setSecret has not completed for this version",
        ));
    }

    ctx.resource
        .test_credential(&pending)
        .await
        .map_err(|e| e.into_rotator_error(STEP))?;

    info!(
        credential_id = ?pending.credential_id(),
        "Credential verified"
    );
    Ok(())
}
