//! Monitoring core: in-memory metric aggregation, periodic health probing,
//! and fan-out to subscribers.
//!
//! The two services here are explicitly constructed and passed to the HTTP
//! layer through [`crate::presentation::http::state::AppState`]; there are
//! no global singletons, so tests build fresh instances per case.

pub mod monitor;
pub mod policy;
pub mod realtime;
pub mod report;
pub mod scheduler;
pub mod store;

pub use monitor::PerformanceMonitor;
pub use realtime::{MonitoringEvent, RealtimeMonitoring};
pub use store::MetricStore;
