// tripshare/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod public_trip_handlers;
pub mod schedule_handlers;
pub mod share_handlers;
pub mod trip_handlers;
