// tripshare/src/models/mod.rs

//! Records held by the persistence layer.

pub mod schedule;
pub mod share_token;
pub mod trip;
pub mod user;

pub use schedule::Schedule;
pub use share_token::ShareCapability;
pub use trip::Trip;
pub use user::{AccountStatus, PendingVerification, User};
