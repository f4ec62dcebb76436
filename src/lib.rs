pub mod auth;
pub mod authenticator;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod request_span;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod user_handlers;
pub mod workout_handlers;
