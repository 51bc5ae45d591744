use async_trait::async_trait;
use scanweb_model::OwnerId;

use crate::error::Result;

/// The authenticated caller a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub owner_id: OwnerId,
}

/// Maps an opaque bearer token to a principal. Unknown, expired and revoked
/// tokens all resolve to `None`.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Principal>>;
}
