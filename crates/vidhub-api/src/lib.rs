// Vidhub API library
// Decision: Shared library for the server binary and the integration tests

// Resource API routes
pub mod api;

// Authentication module
pub mod auth;

// Router assembly
pub mod app;

// Response envelope and pagination
pub mod common;

// Error taxonomy and the single error-to-response conversion point
pub mod error;

// OpenAPI spec generation
pub mod openapi;

// Services layer
pub mod services;

// Multipart staging
pub mod upload;

pub use app::{build_router, AppContext};
