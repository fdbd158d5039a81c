//! HTTP API module for the payroll processing core.
//!
//! This module provides the REST endpoints for managing payroll runs
//! through their lifecycle: create, calculate, submit, approve, process,
//! void, and cancel.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ActorRequest, ApproveRequest, CreateRunRequest, VoidRequest};
pub use response::ApiError;
pub use state::AppState;
