use sqlx::postgres::{PgPool, PgPoolOptions};

/// Builds the Postgres pool without connecting eagerly; the health probes
/// are the first consumers and must be able to observe an unreachable
/// database rather than abort startup.
pub fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)?;
    Ok(pool)
}
