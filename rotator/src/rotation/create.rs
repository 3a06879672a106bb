use rotator_core::{RotationStep, RotatorError, RotatorResult, VersionStage};
use tracing::{info, warn};

use super::{parse_payload, StepContext};

const STEP: RotationStep = RotationStep::CreateSecret;

/// Issue a credential and stage it AWSPENDING under the token
pub(super) async fn create_secret(ctx: &StepContext<'_>) -> RotatorResult<()> {
    match ctx
        .store
        .get_secret_value(ctx.secret_id, Some(ctx.token), Some(&VersionStage::Pending))
        .await
    {
        Ok(_) => {
            info!("Pending version already holds a value");
            return Ok(());
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => {
            return Err(RotatorError::create_failed(format!(
                "cannot read pending version: {}",
                e
            )))
        }
    }

    let current = match ctx
        .store
        .get_secret_value(ctx.secret_id, None, Some(&VersionStage::Current))
        .await
    {
        Ok(value) => parse_payload(value.secret_string.as_deref(), STEP)?,
        Err(e) if e.is_not_found() => None,
        Err(e) => {
            return Err(RotatorError::create_failed(format!(
                "cannot read current version: {}",
                e
            )))
        }
    };

    let pending = ctx
        .resource
        .create_credential(current.as_ref())
        .await
        .map_err(|e| e.into_rotator_error(STEP))?;

    let secret_string = pending
        .to_secret_string()
        .map_err(|e| RotatorError::create_failed(format!("cannot encode payload: {}", e)))?;

    if let Err(e) = ctx
        .store
        .put_secret_value(
            ctx.secret_id,
            ctx.token,
            &secret_string,
            &[VersionStage::Pending],
        )
        .await
    {
        // The credential would otherwise hold a quota slot nobody references
        if let Err(revoke) = ctx.resource.revoke_credential(&pending).await {
            warn!(
                credential_id = ?pending.credential_id(),
                error = %revoke,
                "Could not revoke credential after failed write"
            );
        }
        return Err(RotatorError::create_failed(format!(
            "cannot store pending version: {}",
            e
        )));
    }

    info!(
        credential_id = ?pending.credential_id(),
        "Stored pending version"
    );
    Ok(())
}
