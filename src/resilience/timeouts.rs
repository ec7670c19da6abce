//! Timeout enforcement for catalog lookups.

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::error::CatalogError;

/// Run `fut`, failing with `CatalogError::Timeout` if it outlives `limit`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, CatalogError>
where
    F: Future<Output = Result<T, CatalogError>>,
{
    match time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(CatalogError::Timeout(limit)),
    }
}
