use rotator_core::{RotationStep, RotatorError, RotatorResult, VersionStage};
use tracing::{debug, info, warn};

use super::{parse_payload, StepContext, TokenState};

const STEP: RotationStep = RotationStep::FinishSecret;

/// Promote the pending version to AWSCURRENT, then revoke the old credential
///
/// The outgoing version is marked `ROTATORREVOKE` before the move. Only a
/// marked version is ever revoked, and the marker is cleared once the
/// credential is gone, so a retry can finish a failed revoke without
/// touching credentials this handler never superseded.
pub(super) async fn finish_secret(ctx: &StepContext<'_>) -> RotatorResult<()> {
    let marker = VersionStage::revoke_marker();
    let marked = ctx.description.version_with_stage(&marker);

    if ctx.token_state == TokenState::Current {
        return match marked {
            Some(version_id) if version_id != ctx.token => {
                info!(version_id, "Completing revoke of superseded version");
                revoke_superseded(ctx, version_id).await
            }
            _ => {
                info!("Version is already AWSCURRENT");
                Ok(())
            }
        };
    }

    // Refuse to promote a version that never received a value
    ctx.pending_payload(STEP).await?;

    let current = ctx.description.version_with_stage(&VersionStage::Current);
    if let Some(current) = current {
        if let Some(stale) = marked.filter(|m| *m != current) {
            warn!(version_id = stale, "Dropping revoke marker of an older rotation");
        }
        if marked != Some(current) {
            ctx.store
                .update_secret_version_stage(ctx.secret_id, &marker, Some(current), marked)
                .await
                .map_err(|e| {
                    RotatorError::finish_failed(format!("cannot mark outgoing version: {}", e))
                })?;
        }
    }

    ctx.store
        .update_secret_version_stage(
            ctx.secret_id,
            &VersionStage::Current,
            Some(ctx.token),
            current,
        )
        .await
        .map_err(|e| RotatorError::finish_failed(format!("cannot move AWSCURRENT: {}", e)))?;

    info!(previous_version = ?current, "Moved AWSCURRENT");
    match current {
        Some(previous) => revoke_superseded(ctx, previous).await,
        None => Ok(()),
    }
}

/// Revoke the credential of `version_id`, then clear its revoke marker
async fn revoke_superseded(ctx: &StepContext<'_>, version_id: &str) -> RotatorResult<()> {
    let previous = ctx
        .store
        .get_secret_value(ctx.secret_id, Some(version_id), None)
        .await
        .map_err(|e| {
            RotatorError::finish_failed(format!("cannot read superseded version: {}", e))
        })?;
    let previous = parse_payload(previous.secret_string.as_deref(), STEP)?;

    let current = ctx
        .store
        .get_secret_value(ctx.secret_id, Some(ctx.token), Some(&VersionStage::Current))
        .await
        .map_err(|e| {
            RotatorError::finish_failed(format!("cannot read current version: {}", e))
        })?;
    let current = parse_payload(current.secret_string.as_deref(), STEP)?;

    match previous {
        Some(previous)
            if previous.credential_id().is_some()
                && previous.credential_id()
                    == current.as_ref().and_then(|c| c.credential_id()) =>
        {
            debug!("Previous and current versions share a credential");
        }
        Some(previous) => {
            ctx.resource
                .revoke_credential(&previous)
                .await
                .map_err(|e| e.into_rotator_error(STEP))?;
            info!(
                credential_id = ?previous.credential_id(),
                "Revoked previous credential"
            );
        }
        None => debug!("Superseded version holds no value"),
    }

    ctx.store
        .update_secret_version_stage(
            ctx.secret_id,
            &VersionStage::revoke_marker(),
            None,
            Some(version_id),
        )
        .await
        .map_err(|e| RotatorError::finish_failed(format!("cannot clear revoke marker: {}", e)))
}
