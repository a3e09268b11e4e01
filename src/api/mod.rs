//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Scholar, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Research (`/api/research`)
//! - `POST /api/research` - Search, summarize and score papers for `{"query": "..."}`
//!
//! ## Cache (`/api/cache`)
//! - `GET /api/cache/stats` - Entry count and hit/miss counters
//! - `DELETE /api/cache` - Clear all cached responses
//!
//! ## Health
//! - `GET /` - Service info
//! - `GET /health` - Liveness check with cache stats
//!
//! # Errors
//!
//! Failures return `{"error": "...", "error_type": "..."}`. An empty query is
//! a 400 with `client_input_error`; upstream failures are 500 with
//! `fetch_error`, `generation_error` or `extraction_error`.
//!
//! # OpenAPI Documentation
//!
//! The OpenAPI document is served at `/api-docs/openapi.json`. When the
//! `swagger-ui` feature is enabled, interactive documentation is available
//! at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
