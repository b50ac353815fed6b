pub mod dto;
mod handlers;
pub mod services;
pub mod targets;

use crate::state::AppState;
use axum::Router;

pub use targets::{Nutrient, Nutrients};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
