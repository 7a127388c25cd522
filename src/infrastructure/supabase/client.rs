//! Supabase service-surface probes.
//!
//! The monitoring service treats Supabase purely as an external
//! collaborator: it lists storage buckets and hits the auth health
//! endpoint with the service-role key. Row data never flows through here;
//! table reads go through the Postgres pool directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("supabase request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("supabase returned {0}")]
    Status(StatusCode),
}

/// Probe surface over the Supabase REST endpoints.
///
/// Split out as a trait so the realtime health check can be exercised
/// without network access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupabaseProbes: Send + Sync {
    /// Lists storage buckets; succeeding proves the storage API is up.
    async fn check_storage(&self) -> Result<(), SupabaseError>;

    /// Hits the auth service health endpoint.
    async fn check_auth(&self) -> Result<(), SupabaseError>;
}

pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, service_key: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    async fn get_ok(&self, path: &str) -> Result<(), SupabaseError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SupabaseError::Status(response.status()))
        }
    }
}

#[async_trait]
impl SupabaseProbes for SupabaseClient {
    async fn check_storage(&self) -> Result<(), SupabaseError> {
        self.get_ok("/storage/v1/bucket").await
    }

    async fn check_auth(&self) -> Result<(), SupabaseError> {
        self.get_ok("/auth/v1/health").await
    }
}
