//! HTTP API handlers for artcast-cr

pub mod auth;
pub mod health;
pub mod publish;
pub mod review;
pub mod submissions;

pub use auth::auth_routes;
pub use health::health_routes;
pub use submissions::submission_routes;
