use crate::errors::RepoError;
use crate::models::{BookmarkedPost, Viewer};
use async_trait::async_trait;
use uuid::Uuid;

/// Trait for resolving session tokens to viewers.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static { // Send+Sync+'static required for Arc<dyn>
    /// Resolves a session token to the viewer it belongs to.
    /// Returns Ok(None) for unknown tokens.
    async fn resolve(&self, token: &str) -> Result<Option<Viewer>, RepoError>;
}

/// Trait defining operations on a user's bookmark rows.
#[async_trait]
pub trait BookmarkRepository: Send + Sync + 'static {
    /// Fetches every bookmark for the user with nested post and author data.
    /// WARNING: unbounded; the page slices the result itself rather than
    /// paginating server-side.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookmarkedPost>, RepoError>;

    /// Removes the user's bookmark rows for the given posts.
    async fn remove(&self, user_id: Uuid, post_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Remote procedure that deletes a post together with its related data.
/// Transactional scope is the backend's concern, not the page's.
#[async_trait]
pub trait ForumRpc: Send + Sync + 'static {
    async fn delete_post_with_related(&self, post_id: Uuid) -> Result<(), RepoError>;
}
