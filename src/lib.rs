//! Football fixture list service with an odds analytics engine.
//!
//! - [`analytics`]: pure Poisson / market / BVS computations
//! - [`db`]: SQLite storage for fixtures and saved predictions
//! - [`api`]: the axum HTTP API over both

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
