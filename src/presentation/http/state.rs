use crate::{
    config::Config,
    monitoring::{PerformanceMonitor, RealtimeMonitoring},
};
use std::sync::Arc;

/// Explicitly constructed service handles passed to every route. One
/// instance of each service per process, but never a global: tests build
/// fresh state per case.
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<PerformanceMonitor>,
    pub realtime: Arc<RealtimeMonitoring>,
    pub config: Config,
}
