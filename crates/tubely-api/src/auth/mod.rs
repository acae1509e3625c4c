//! Caller identity
//!
//! Every protected handler takes an [`AuthUser`], which resolves the bearer token
//! through the [`IdentityProvider`] held in application state.

pub mod jwt;
pub mod models;

pub use jwt::JwtIdentityProvider;
pub use models::{AuthUser, JwtClaims};

use async_trait::async_trait;
use tubely_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the caller's user id.
    async fn authenticate(&self, token: &str) -> Result<Uuid, AppError>;
}
