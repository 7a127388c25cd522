//! Observability service for the nutrition platform: operation timing,
//! health probing against Postgres and the Supabase surface, bounded
//! in-memory aggregation, and an HTTP/SSE/WebSocket read surface.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod monitoring;
pub mod presentation;
