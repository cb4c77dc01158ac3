// tripshare/src/web/extractors.rs

//! Typed request guards. Each one runs the access gates for its route and
//! yields what the accepted gates resolved, so handlers never look a
//! principal or a trip up a second time.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Trip;
use crate::services::access_service;
use crate::state::AppState;

/// Route segment holding a trip id.
pub const TRIP_ID_PARAM: &str = "trip_id";
/// Route segment holding a raw share secret.
pub const SHARE_TOKEN_PARAM: &str = "share_token";

/// A caller that passed the bearer gate.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated {
  pub principal_id: Uuid,
}

/// A caller that passed the bearer and ownership gates for the trip in the route.
#[derive(Debug, Clone)]
pub struct OwnedTrip {
  pub principal_id: Uuid,
  pub trip: Trip,
}

/// A trip reached through its share secret. Carries no principal.
#[derive(Debug, Clone)]
pub struct SharedTrip {
  pub trip: Trip,
}

/// Any extractor that resolved a trip through its gates. Handlers generic over
/// it serve the owner routes and the share-link routes alike.
pub trait GatedTrip: FromRequest + 'static {
  fn trip(&self) -> &Trip;
  fn into_trip(self) -> Trip;
}

impl GatedTrip for OwnedTrip {
  fn trip(&self) -> &Trip {
    &self.trip
  }

  fn into_trip(self) -> Trip {
    self.trip
  }
}

impl GatedTrip for SharedTrip {
  fn trip(&self) -> &Trip {
    &self.trip
  }

  fn into_trip(self) -> Trip {
    self.trip
  }
}

fn app_state(req: &HttpRequest) -> Result<AppState, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .map(|data| data.get_ref().clone())
    .ok_or_else(|| AppError::Internal("application state is not configured".to_string()))
}

/// The raw `Authorization` header, when present and valid UTF-8.
fn authorization_header(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string)
}

impl FromRequest for Authenticated {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let header = authorization_header(req);
    Box::pin(async move {
      let state = state?;
      let principal_id = access_service::authenticate(&state, header.as_deref()).await?;
      Ok(Authenticated { principal_id })
    })
  }
}

impl FromRequest for OwnedTrip {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let header = authorization_header(req);
    let trip_id = req.match_info().get(TRIP_ID_PARAM).unwrap_or_default().to_string();
    Box::pin(async move {
      let state = state?;
      let (principal_id, trip) = access_service::authorize_trip_owner(&state, header.as_deref(), &trip_id).await?;
      Ok(OwnedTrip { principal_id, trip })
    })
  }
}

impl FromRequest for SharedTrip {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let secret = req.match_info().get(SHARE_TOKEN_PARAM).unwrap_or_default().to_string();
    Box::pin(async move {
      let state = state?;
      let trip = access_service::authorize_capability(&state, &secret).await?;
      Ok(SharedTrip { trip })
    })
  }
}
