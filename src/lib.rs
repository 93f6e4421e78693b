#![doc = "The `odot` library crate."]
#![doc = ""]
#![doc = "Google sign-in, rotating session credentials and the project API of the odot"]
#![doc = "backend. The binary (`main.rs`) loads configuration, connects the store and"]
#![doc = "mounts `routes::config` under `/api`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod secret;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::{AppState, ServiceMetadata};
