pub mod activity;
pub mod error;
pub mod query;
pub mod ring;
pub mod system;
pub mod trend;

pub use activity::{RECENT_ACTIVITY_CAP, ActivityEntry, UserActivityMetric};
pub use error::{ERRORS_CAP, ErrorRecord, Severity};
pub use query::{RECENT_CALLS_CAP, QueryCall, QueryMetric};
pub use ring::BoundedBuffer;
pub use system::{SYSTEM_SAMPLES_CAP, MemoryUsage, SystemSample};
pub use trend::Trend;
