//! Web layer for the subway admin service.
//!
//! Provides JSON endpoints for managing stations, lines and the ordered
//! stations of each line.

mod dto;
mod routes;
mod state;

#[cfg(test)]
mod acceptance_tests;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
