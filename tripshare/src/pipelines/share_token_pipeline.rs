// tripshare/src/pipelines/share_token_pipeline.rs

//! Issues the share capability of a trip.
//!
//! Without `regenerate` an existing capability is a conflict; the live link is
//! never replaced by accident. With `regenerate` the stored hash is overwritten,
//! which immediately invalidates the previously distributed secret.

use crate::errors::AppError;
use crate::models::ShareCapability;
use crate::pipelines::contexts::{filled, ShareTokenCtxData};
use crate::store::StoreError;
use std::sync::Arc;
use tollgate::{ContextData, Pipeline, PipelineControl, SkipCondition, Tollgate};
use tracing::{info, warn};

pub fn register_share_token_pipeline(tollgate: &Arc<Tollgate<AppError>>) {
  let skip_when_regenerating: SkipCondition<ShareTokenCtxData> = Arc::new(|c: &ShareTokenCtxData| c.regenerate);

  let mut share_p = Pipeline::<ShareTokenCtxData, AppError>::new(&[
    ("check_existing_capability", false, Some(skip_when_regenerating)),
    ("issue_share_secret", false, None),
    ("store_capability", false, None),
  ]);

  share_p.on_root("check_existing_capability", |ctx_data: ContextData<ShareTokenCtxData>| {
    Box::pin(async move {
      let (share_tokens, trip_id) = ctx_data.with(|c| (c.app_state.share_tokens.clone(), c.trip_id));
      if share_tokens.find_by_trip(trip_id).await?.is_some() {
        warn!(%trip_id, "Share link requested without regenerate while one exists.");
        return Err(already_shared());
      }
      Ok(PipelineControl::Continue)
    })
  });

  share_p.on_root("issue_share_secret", |ctx_data: ContextData<ShareTokenCtxData>| {
    Box::pin(async move {
      let secrets = ctx_data.with(|c| c.app_state.secrets.clone());
      let issued = secrets.issue_token()?;
      ctx_data.update(|c| c.issued = Some(issued));
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  share_p.on_root("store_capability", |ctx_data: ContextData<ShareTokenCtxData>| {
    Box::pin(async move {
      let (share_tokens, trip_id, regenerate, issued) = ctx_data.with(|c| {
        (
          c.app_state.share_tokens.clone(),
          c.trip_id,
          c.regenerate,
          filled(&c.issued, "issued"),
        )
      });
      let issued = issued?;

      let capability = if regenerate {
        share_tokens.upsert(trip_id, &issued.hash).await?
      } else {
        let capability = ShareCapability::new(trip_id, issued.hash.clone());
        // A concurrent first issuance can slip past the existence check.
        share_tokens.insert(&capability).await.map_err(|err| match err {
          StoreError::UniqueViolation { .. } => already_shared(),
          other => AppError::from(other),
        })?;
        capability
      };

      info!(%trip_id, regenerate, "Share capability stored.");
      ctx_data.update(|c| c.capability = Some(capability));
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  tollgate.register_pipeline(share_p);
  info!("Share-token pipeline registered.");
}

fn already_shared() -> AppError {
  AppError::Conflict("Trip already has a share link; pass regenerate=true to replace it.".to_string())
}
