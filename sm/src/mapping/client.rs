//! MappingClient trait definition

use async_trait::async_trait;

use super::{MappingError, MappingRequest, MappingResult};

/// Submits mapping requests to the remote service
///
/// One call is one attempt: implementations do not retry and do not cache.
#[async_trait]
pub trait MappingClient: Send + Sync {
    /// Send `request` and wait for the service's mapping
    async fn submit(&self, request: &MappingRequest) -> Result<MappingResult, MappingError>;
}
