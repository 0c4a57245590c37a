//! Permission-group side effects for rank assets.
//!
//! When a rank asset is assigned or removed, the in-game permission
//! system should follow. The hook is best-effort: a failing or missing
//! permission backend never affects the outcome of the asset operation
//! itself; the engine logs the failure and moves on.

use thiserror::Error;
use tracing::info;

/// A permission backend refused or failed to apply a rank change.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SideEffectError(pub String);

/// Hook into the in-game permission system.
#[async_trait::async_trait]
pub trait RankSideEffects: Send + Sync {
    /// Grant the in-game privileges for a rank to an identity.
    async fn apply_rank(&self, identity: &str, rank: &str) -> Result<(), SideEffectError>;

    /// Revoke the in-game privileges for a rank from an identity.
    async fn remove_rank(&self, identity: &str, rank: &str) -> Result<(), SideEffectError>;

    /// Name of the backing permission system, for diagnostics.
    fn name(&self) -> &'static str;
}

/// Stand-in used when no permission backend is wired up: rank changes are
/// only logged, never applied.
pub struct LoggingRankSideEffects;

#[async_trait::async_trait]
impl RankSideEffects for LoggingRankSideEffects {
    async fn apply_rank(&self, identity: &str, rank: &str) -> Result<(), SideEffectError> {
        info!("Virtual rank {} applied to {} (no permission backend)", rank, identity);
        Ok(())
    }

    async fn remove_rank(&self, identity: &str, rank: &str) -> Result<(), SideEffectError> {
        info!("Virtual rank {} removed from {} (no permission backend)", rank, identity);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}
