pub mod client;

pub use client::{SupabaseClient, SupabaseError, SupabaseProbes};
