// tripshare/src/web/routes.rs

use actix_web::{error, web, HttpResponse};

use crate::errors::AppError;
use crate::web::extractors::{OwnedTrip, SharedTrip};
use crate::web::handlers::{auth_handlers, public_trip_handlers, schedule_handlers, share_handlers, trip_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Malformed bodies and query strings are answered like any other validation failure.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| {
    let reason = err.to_string();
    error::Error::from(AppError::Validation {
      field: "body".to_string(),
      reason,
    })
  })
}

fn query_config() -> web::QueryConfig {
  web::QueryConfig::default().error_handler(|err, _req| {
    let reason = err.to_string();
    error::Error::from(AppError::Validation {
      field: "query".to_string(),
      reason,
    })
  })
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .app_data(query_config())
    .route("/health", web::get().to(health_check_handler))
    // Identity
    .route("/signup", web::post().to(auth_handlers::signup_handler))
    .route("/users/verify/{token}", web::post().to(auth_handlers::verify_email_handler))
    .route("/login", web::post().to(auth_handlers::login_handler))
    .route("/logout", web::post().to(auth_handlers::logout_handler))
    .route("/me", web::get().to(auth_handlers::me_handler))
    .route("/me/password", web::put().to(auth_handlers::change_password_handler))
    // Trips: bearer, plus ownership on every /trips/{trip_id} route
    .service(
      web::scope("/trips")
        .route("", web::post().to(trip_handlers::create_trip_handler))
        .route("", web::get().to(trip_handlers::list_trips_handler))
        .route("/{trip_id}", web::get().to(trip_handlers::get_trip_handler))
        .route("/{trip_id}", web::put().to(trip_handlers::update_trip_handler))
        .route("/{trip_id}", web::delete().to(trip_handlers::delete_trip_handler))
        .route("/{trip_id}/share", web::post().to(share_handlers::share_trip_handler))
        .route("/{trip_id}/share", web::get().to(share_handlers::share_status_handler))
        .route(
          "/{trip_id}/details",
          web::get().to(schedule_handlers::trip_details_handler::<OwnedTrip>),
        )
        .route(
          "/{trip_id}/schedules",
          web::get().to(schedule_handlers::list_schedules_handler::<OwnedTrip>),
        )
        .route(
          "/{trip_id}/schedules",
          web::post().to(schedule_handlers::add_schedule_handler::<OwnedTrip>),
        )
        .route(
          "/{trip_id}/schedules/{schedule_id}",
          web::get().to(schedule_handlers::get_schedule_handler::<OwnedTrip>),
        )
        .route(
          "/{trip_id}/schedules/{schedule_id}",
          web::patch().to(schedule_handlers::update_schedule_handler::<OwnedTrip>),
        )
        .route(
          "/{trip_id}/schedules/{schedule_id}",
          web::delete().to(schedule_handlers::delete_schedule_handler::<OwnedTrip>),
        ),
    )
    // Capability routes
    .service(
      web::scope("/public/trips")
        .route("/{share_token}", web::get().to(public_trip_handlers::get_shared_trip_handler))
        .route("/{share_token}", web::put().to(public_trip_handlers::update_shared_trip_handler))
        .route(
          "/{share_token}/details",
          web::get().to(schedule_handlers::trip_details_handler::<SharedTrip>),
        )
        .route(
          "/{share_token}/schedules",
          web::get().to(schedule_handlers::list_schedules_handler::<SharedTrip>),
        )
        .route(
          "/{share_token}/schedules",
          web::post().to(schedule_handlers::add_schedule_handler::<SharedTrip>),
        )
        .route(
          "/{share_token}/schedules/{schedule_id}",
          web::get().to(schedule_handlers::get_schedule_handler::<SharedTrip>),
        )
        .route(
          "/{share_token}/schedules/{schedule_id}",
          web::patch().to(schedule_handlers::update_schedule_handler::<SharedTrip>),
        )
        .route(
          "/{share_token}/schedules/{schedule_id}",
          web::delete().to(schedule_handlers::delete_schedule_handler::<SharedTrip>),
        ),
    );
}
