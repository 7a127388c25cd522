pub mod file_logger;

pub use file_logger::FileLogger;
