// src/lib.rs

pub mod config;
pub mod error;
pub mod extraction;
pub mod grading;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Re-exported so integration tests can build the app
pub use routes::create_router;
