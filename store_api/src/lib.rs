// store_api/src/lib.rs

//! Online-store HTTP API: goods, carts and orders over PostgreSQL.
//!
//! Layers, leaf first:
//!  - [`repository`]: one statement per operation (checkout runs in a transaction).
//!  - [`services`]: pass-through with call deadlines and error context.
//!  - [`validation`]: request field rules and their English messages.
//!  - [`web`]: actix-web handlers and the `/api` routes.

pub mod config;
pub mod errors;
pub mod models;
pub mod repository;
pub mod services;
pub mod state;
pub mod validation;
pub mod web;

pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::state::AppState;
