use async_trait::async_trait;
use scanweb_model::OwnerId;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    database::ports::principals::{Principal, PrincipalResolver},
    error::{Result, ScanError},
};

/// Resolves bearer tokens against the externally managed `sessions` table.
/// Only the SHA-256 of a token is ever stored or compared.
#[derive(Clone, Debug)]
pub struct PostgresPrincipalResolver {
    pool: PgPool,
}

impl PostgresPrincipalResolver {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl PrincipalResolver for PostgresPrincipalResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Principal>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM sessions \
             WHERE token_hash = $1 AND revoked = FALSE AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            ScanError::Persistence(format!("Failed to validate session: {}", e))
        })?;

        Ok(user_id.map(|id| Principal {
            owner_id: OwnerId(id),
        }))
    }
}
